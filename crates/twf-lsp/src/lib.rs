//! TWF Language Server Protocol implementation (§4.7, §4.8).
//!
//! Editor-facing surface for the TWF workflow language: diagnostics, hover,
//! go-to-definition, references, rename, completion, document symbols,
//! folding, code actions, signature help, semantic tokens, and inlay hints,
//! served over stdio via `tower-lsp`.

pub mod pos;
pub mod queries;
pub mod server;
pub mod signature;

use tower_lsp::{LspService, Server};

use server::TwfBackend;

/// Runs the TWF LSP server on stdin/stdout until the client disconnects.
/// This is the entry point invoked by `twfc lsp`.
pub async fn run_server() {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(TwfBackend::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
