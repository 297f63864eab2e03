use ratatui::style::Color;

pub const CURSOR_INDICATOR: char = '▌';
pub const EMPTY_TREE_TEXT: &str = "Empty tree";
pub const LOAD_FAILED_TEXT: &str = "Failed to load tree";
pub const MIRROR_TITLE: &str = " mirror ";
pub const CONNECTOR_WIDTH: f64 = 2.0;

// Colors of the tree drawing itself.
pub mod palette {
    use super::Color;

    pub const BINARY_FILL: Color = Color::Rgb(0x4C, 0xAF, 0x50);
    pub const BINARY_STROKE: Color = Color::Rgb(0x38, 0x8E, 0x3C);
    pub const MARY_FILL: Color = Color::Rgb(0x21, 0x96, 0xF3);
    pub const MARY_STROKE: Color = Color::Rgb(0x19, 0x76, 0xD2);
    pub const CONNECTOR: Color = Color::Rgb(0x33, 0x33, 0x33);
    pub const LABEL: Color = Color::Rgb(0xFF, 0xFF, 0xFF);
    pub const PLACEHOLDER: Color = Color::Rgb(0x99, 0x99, 0x99);
}

// Prompt prefixes shown in the status line while reading input.
pub mod prompt {
    pub const INSERT: &str = "Insert value: ";
    pub const DELETE: &str = "Delete value: ";
    pub const DEGREE: &str = "M-Vías degree: ";
}
