//! # kithab-cli — Command-Line Front End for the Notes Portal
//!
//! Provides the `kithab` binary. Each portal screen becomes a subcommand:
//!
//! - `kithab login` / `logout` / `whoami` / `forgot-password` — account.
//! - `kithab browse` — student view: pick a subject, list and save notes.
//! - `kithab upload`, `kithab uploads` — faculty uploads.
//! - `kithab admin notes|faculty|meta` — admin management.
//!
//! ```bash
//! kithab login --id E100 < password.txt
//! kithab browse -r R20 -b CSE -s 3 --subject CS201 --download-dir notes/
//! kithab upload unit1.pdf -r R20 -b CSE -s 3 --subject CS201
//! kithab admin faculty list --search rao
//! ```
//!
//! The session is stored in a file (see [`config`]) so a login survives
//! between invocations until the token expires.

pub mod account;
pub mod admin;
pub mod browse;
pub mod config;
pub mod context;
pub mod select;
pub mod upload;

pub use config::CliConfig;
pub use context::AppContext;
