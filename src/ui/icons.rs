/// Glyphs prefixing report lines
pub struct Icons;

impl Icons {
    pub const SNAKE: &str = "🐍";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const CLOCK: &str = "⏱️";
}
