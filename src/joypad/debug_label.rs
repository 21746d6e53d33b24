//! On-pad text showing the raw state bytes, enabled by a `dbg` cell

/// `:00:40:00:` style dump
pub fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::from(":"), |acc, byte| format!("{}{:02x}:", acc, byte))
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DebugLabel {
    message: String,
    text: String,
}

impl DebugLabel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    /// Shows the announced control ids until the first state push
    pub fn show_announcement(&mut self, ids: &str) {
        self.text = format!("{}\n{}", ids, self.message);
    }

    pub fn refresh(&mut self, state: &[u8]) {
        self.text = format!("{}\n{}", hex_dump(state), self.message);
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_pads_every_byte() {
        assert_eq!(hex_dump(&[0, 0x40, 0x0a, 0xff]), ":00:40:0a:ff:");
        assert_eq!(hex_dump(&[]), ":");
    }

    #[test]
    fn label_keeps_message_under_dump() {
        let mut label = DebugLabel::new();
        label.show_announcement("j1,b1");
        assert_eq!(label.text(), "j1,b1\n");
        label.set_message("calibrated");
        label.refresh(&[0, 1]);
        assert_eq!(label.text(), ":00:01:\ncalibrated");
    }
}
