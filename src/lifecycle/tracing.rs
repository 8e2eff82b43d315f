//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing` subscriber filtered by `RUST_LOG`.
//!
//! ## What Gets Traced
//!
//! - **Registry**: every scanned class and the role it was classified as (`debug`)
//! - **Group lifecycle**: `Creating`, `Created`, `Destroying`, `Destroyed` with the `group_id`
//! - **Assembly steps**: `Instantiated`, `Wired`, `Init hook done` per role (`debug`)
//! - **Failures**: hook failures and rollbacks as `warn` with the stage and error
//!
//! ## Usage Examples
//!
//! ```bash
//! # Lifecycle transitions only
//! RUST_LOG=info cargo run
//!
//! # Every assembly step
//! RUST_LOG=debug cargo run
//!
//! # Only the manager
//! RUST_LOG=mvc_lifecycle::lifecycle=debug cargo run
//! ```
//!
//! **With `RUST_LOG=info`**:
//!
//! ```text
//! INFO create{template="sample" instance_id=Some("main")}: Creating group_id="main" template="sample"
//! INFO create{template="sample" instance_id=Some("main")}: Created group_id="main" roles=[Model, View, Controller] live=1
//! INFO destroy{id="main"}: Destroying group_id="main"
//! INFO destroy{id="main"}: Destroyed group_id="main" hook_failures=0
//! ```
//!
//! Spans come from `#[instrument]` on the public manager operations, so nested creates
//! (child groups created from an init hook) show up inside their parent's span.

pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // group_id and role fields identify the source
        .compact()
        .init();
}
