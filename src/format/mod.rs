//! Structural text-style descriptors.
//!
//! Editors that grew out of string-assembled tag names ("bold_italic_14")
//! compared styles by identifier. Here a style is a value: a set of flags, a
//! point size and an alignment, compared and combined structurally. Toggling
//! an active flag removes it; changing size or alignment preserves the rest.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StyleFlags: u8 {
        const BOLD = 0b001;
        const ITALIC = 0b010;
        const UNDERLINE = 0b100;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

pub const DEFAULT_FONT_SIZE: u16 = 12;

/// One composite style descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    pub flags: StyleFlags,
    pub size: u16,
    pub alignment: Alignment,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            flags: StyleFlags::empty(),
            size: DEFAULT_FONT_SIZE,
            alignment: Alignment::Left,
        }
    }
}

impl TextStyle {
    /// Toggling an already-active flag removes it.
    pub fn toggled(mut self, flag: StyleFlags) -> Self {
        self.flags.toggle(flag);
        self
    }

    /// Changing the size preserves any active flags and alignment.
    pub fn with_size(mut self, size: u16) -> Self {
        self.size = size.max(1);
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_twice_returns_to_plain() {
        let style = TextStyle::default()
            .toggled(StyleFlags::BOLD)
            .toggled(StyleFlags::BOLD);
        assert!(style.is_plain());
    }

    #[test]
    fn size_change_preserves_flags() {
        let style = TextStyle::default()
            .toggled(StyleFlags::BOLD)
            .toggled(StyleFlags::UNDERLINE)
            .with_size(18);
        assert!(style.flags.contains(StyleFlags::BOLD | StyleFlags::UNDERLINE));
        assert_eq!(style.size, 18);
    }

    #[test]
    fn size_never_drops_below_one() {
        assert_eq!(TextStyle::default().with_size(0).size, 1);
    }

    #[test]
    fn composite_styles_compare_structurally() {
        let a = TextStyle::default()
            .toggled(StyleFlags::ITALIC)
            .toggled(StyleFlags::BOLD);
        let b = TextStyle::default()
            .toggled(StyleFlags::BOLD)
            .toggled(StyleFlags::ITALIC);
        assert_eq!(a, b);
    }

    #[test]
    fn alignment_change_preserves_flags_and_size() {
        let style = TextStyle::default()
            .toggled(StyleFlags::ITALIC)
            .with_size(16)
            .with_alignment(Alignment::Center);
        assert!(style.flags.contains(StyleFlags::ITALIC));
        assert_eq!(style.size, 16);
        assert_eq!(style.alignment, Alignment::Center);
    }
}
