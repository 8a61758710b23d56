//! What can go wrong between `mmtb.toml` on disk and a validated project.

/// A rejected `mmtb.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read mmtb.toml: {0}")]
    Read(#[from] std::io::Error),

    /// Not valid TOML, or a table has the wrong shape.
    #[error("malformed mmtb.toml: {0}")]
    Syntax(String),

    /// A field that must be set is absent or empty.
    #[error("`{0}` must be set")]
    MissingField(String),

    /// A testbench refers to a design that is not declared.
    #[error("testbench '{testbench}' uses unknown design '{design}'")]
    UnknownDesign {
        /// The testbench making the reference.
        testbench: String,
        /// The undeclared design name.
        design: String,
    },

    /// Two testbenches share a name.
    #[error("duplicate testbench name '{0}'")]
    DuplicateTestbench(String),

    /// Parsed, but a value is out of range or inconsistent.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
