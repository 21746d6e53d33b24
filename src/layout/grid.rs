//! Grid-template text: normalization, tokenization and cell geometry

use crate::geometry::Rect;
use tracing::debug;

/// Source of the layout text and of the on-screen rectangle of each label.
///
/// In a browser this is the computed `grid-template-areas` of the pad plus
/// `getBoundingClientRect` of each control element. [`GridLayout`] provides
/// the same answers from the text alone, with uniform tracks.
pub trait LayoutSource {
    fn grid_template_areas(&self) -> String;

    /// Bounding rectangle of every cell carrying `id`
    fn bounding_rect(&self, id: &str) -> Option<Rect>;
}

/// Splits the raw template into rows of whitespace separated cells.
///
/// Accepts the CSS form (`"j1 . b1" "j1 . b2"`, single or double quotes) as
/// well as plain line-separated text. `none` means no template.
fn split_rows(raw: &str) -> Vec<Vec<String>> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "none" {
        return Vec::new();
    }

    let rows: Vec<String> = if raw.contains(['"', '\'']) {
        raw.split(['"', '\''])
            .skip(1)
            .step_by(2)
            .map(str::to_string)
            .collect()
    } else {
        raw.lines().map(str::to_string).collect()
    };

    rows.iter()
        .map(|row| row.split_whitespace().map(str::to_string).collect::<Vec<_>>())
        .filter(|cells| !cells.is_empty())
        .collect()
}

/// One row per line, single spaces between cells, no quotes
pub fn normalize_grid_areas(raw: &str) -> String {
    split_rows(raw)
        .iter()
        .map(|cells| cells.join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

/// True for CSS null cell tokens (`.`, `...`)
pub fn is_blank_cell(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c == '.')
}

/// Every non-blank cell label in reading order, duplicates included
pub fn cell_labels(raw: &str) -> Vec<String> {
    split_rows(raw)
        .into_iter()
        .flatten()
        .filter(|token| !is_blank_cell(token))
        .collect()
}

/// Layout computed from the template text over a viewport, with equally sized
/// rows and columns
#[derive(Clone, Debug, PartialEq)]
pub struct GridLayout {
    template: String,
    rows: Vec<Vec<String>>,
    viewport: Rect,
}

impl GridLayout {
    pub fn parse(template: &str, viewport: Rect) -> Self {
        let rows = split_rows(template);
        debug!(
            "Parsed grid template with {} rows over {:?}",
            rows.len(),
            viewport
        );
        Self {
            template: template.to_string(),
            rows,
            viewport,
        }
    }

    /// Same template laid over another viewport, e.g. after a resize
    pub fn with_viewport(&self, viewport: Rect) -> Self {
        Self {
            template: self.template.clone(),
            rows: self.rows.clone(),
            viewport,
        }
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn cell_rect(&self, row: usize, column: usize) -> Rect {
        let cell_width = self.viewport.width / self.column_count().max(1) as f32;
        let cell_height = self.viewport.height / self.row_count().max(1) as f32;
        Rect::new(
            self.viewport.x + column as f32 * cell_width,
            self.viewport.y + row as f32 * cell_height,
            cell_width,
            cell_height,
        )
    }
}

impl LayoutSource for GridLayout {
    fn grid_template_areas(&self) -> String {
        self.template.clone()
    }

    fn bounding_rect(&self, id: &str) -> Option<Rect> {
        let mut bounds: Option<Rect> = None;
        for (row, cells) in self.rows.iter().enumerate() {
            for (column, cell) in cells.iter().enumerate() {
                if cell == id {
                    let rect = self.cell_rect(row, column);
                    bounds = Some(match bounds {
                        Some(b) => b.union(&rect),
                        None => rect,
                    });
                }
            }
        }
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_css_value() {
        let raw = r#" "j1   .  b1"   "j1 . b2" "#;
        assert_eq!(normalize_grid_areas(raw), "j1 . b1\nj1 . b2");
    }

    #[test]
    fn normalizes_single_quotes_and_plain_lines() {
        assert_eq!(normalize_grid_areas("'a1 b1' 'a2 b2'"), "a1 b1\na2 b2");
        assert_eq!(normalize_grid_areas("  j1  b1 \n\n k1 "), "j1 b1\nk1");
    }

    #[test]
    fn none_is_empty() {
        assert_eq!(normalize_grid_areas("none"), "");
        assert!(cell_labels("none").is_empty());
    }

    #[test]
    fn labels_skip_blank_cells() {
        assert_eq!(
            cell_labels(r#""j1 . ..." "j1 b1 b1""#),
            vec!["j1", "j1", "b1", "b1"]
        );
    }

    #[test]
    fn bounding_rect_unions_cells() {
        let grid = GridLayout::parse(
            r#""j1 j1 b1" "j1 j1 b2""#,
            Rect::new(0.0, 0.0, 300.0, 200.0),
        );
        assert_eq!(grid.bounding_rect("j1"), Some(Rect::new(0.0, 0.0, 200.0, 200.0)));
        assert_eq!(grid.bounding_rect("b2"), Some(Rect::new(200.0, 100.0, 100.0, 100.0)));
        assert_eq!(grid.bounding_rect("k1"), None);
    }

    #[test]
    fn cross_shaped_label_gets_its_bounding_box() {
        let grid = GridLayout::parse(
            r#"". dp ." "dp dp dp" ". dp .""#,
            Rect::new(0.0, 0.0, 90.0, 90.0),
        );
        assert_eq!(grid.bounding_rect("dp"), Some(Rect::new(0.0, 0.0, 90.0, 90.0)));
    }

    #[test]
    fn resize_keeps_template() {
        let grid = GridLayout::parse(r#""j1 b1""#, Rect::new(0.0, 0.0, 200.0, 100.0));
        let resized = grid.with_viewport(Rect::new(0.0, 0.0, 400.0, 100.0));
        assert_eq!(resized.bounding_rect("b1"), Some(Rect::new(200.0, 0.0, 200.0, 100.0)));
        assert_eq!(resized.grid_template_areas(), grid.grid_template_areas());
    }
}
