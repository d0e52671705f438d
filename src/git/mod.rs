pub mod executor;
pub mod format;
pub mod locks;
pub mod parser;
pub mod service;
pub mod wire;

pub use executor::{CommandOutput, CommandRunner, GitExecutor};
pub use format::DateStyle;
pub use locks::{DirectoryGuard, DirectoryLocks};
pub use parser::{
    BlameLine, BlameMetadata, BranchEntry, CommitRecord, DecodeSkip, FileStatusCode,
    FileStatusEntry, Parsed, ParserKind, RemoteEntry, StashEntry,
};
pub use service::{BranchScope, ConflictStrategy, GitService};
