pub struct Icons;

impl Icons {
    pub const STAMP: &str = "📮";
    pub const CHECK: &str = "✅";
    pub const INFO: &str = "ℹ️";
    pub const NEW: &str = "✨";
    pub const DEL: &str = "🗑️";
    pub const EURO: &str = "💶";
    pub const EMPTY: &str = "∅";
}
