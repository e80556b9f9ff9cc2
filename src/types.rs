/// A config operation, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigAction {
    /// Every flat key, or only those under `prefix`.
    List { prefix: Option<String> },
    /// One flat key, exactly as written in the flat map.
    Get { key: String },
    /// A path into the nested document, indices allowed.
    Query { path: String },
    /// Write a value at a path in the config file.
    Set { path: String, value: String },
}
