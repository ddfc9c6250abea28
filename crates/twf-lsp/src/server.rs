//! Tower-lsp `LanguageServer` implementation (§4.8).
//!
//! Advertises the capability set enumerated in §4.7/§6.4 and routes each
//! request to the matching pure query function over the document store's
//! current snapshot (§5). Diagnostics are published synchronously inside
//! `did_open`/`did_change` and cleared on `did_close`.

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use twf_analysis::DocumentStore;

use crate::queries;

pub struct TwfBackend {
    client: Client,
    documents: DocumentStore,
}

impl TwfBackend {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            documents: DocumentStore::new(),
        }
    }

    async fn analyze_and_publish(&self, uri: Url, text: String) {
        let doc = self.documents.open(uri.to_string(), text);
        let diagnostics = queries::diagnostics::diagnostics_for(&doc);
        self.client.publish_diagnostics(uri, diagnostics, None).await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for TwfBackend {
    async fn initialize(&self, _: InitializeParams) -> Result<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                definition_provider: Some(OneOf::Left(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: None,
                    resolve_provider: Some(false),
                    ..Default::default()
                }),
                references_provider: Some(OneOf::Left(true)),
                rename_provider: Some(OneOf::Right(RenameOptions {
                    prepare_provider: Some(true),
                    work_done_progress_options: Default::default(),
                })),
                folding_range_provider: Some(FoldingRangeProviderCapability::Simple(true)),
                code_action_provider: Some(CodeActionProviderCapability::Options(CodeActionOptions {
                    code_action_kinds: Some(vec![CodeActionKind::QUICKFIX, CodeActionKind::REFACTOR]),
                    resolve_provider: Some(false),
                    work_done_progress_options: Default::default(),
                })),
                signature_help_provider: Some(SignatureHelpOptions {
                    trigger_characters: Some(vec!["(".to_string()]),
                    retrigger_characters: None,
                    work_done_progress_options: Default::default(),
                }),
                semantic_tokens_provider: Some(SemanticTokensServerCapabilities::SemanticTokensOptions(SemanticTokensOptions {
                    legend: queries::semantic_tokens::legend(),
                    full: Some(SemanticTokensFullOptions::Bool(true)),
                    range: Some(false),
                    work_done_progress_options: Default::default(),
                })),
                inlay_hint_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client.log_message(MessageType::INFO, "twf language server initialized").await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.analyze_and_publish(params.text_document.uri, params.text_document.text).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // TextDocumentSyncKind::FULL: the first (only) content change carries
        // the entire document.
        if let Some(change) = params.content_changes.into_iter().next() {
            self.analyze_and_publish(params.text_document.uri, change.text).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents.close(&params.text_document.uri.to_string());
        self.client.publish_diagnostics(params.text_document.uri, vec![], None).await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = params.text_document_position_params.text_document.uri.to_string();
        let position = params.text_document_position_params.position;
        let Some(doc) = self.documents.get(&uri) else { return Ok(None) };
        Ok(queries::hover::hover(&doc.file, position))
    }

    async fn goto_definition(&self, params: GotoDefinitionParams) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let Some(doc) = self.documents.get(&uri.to_string()) else { return Ok(None) };
        Ok(queries::definition::goto_definition(&uri, &doc.file, position))
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let include_declaration = params.context.include_declaration;
        let Some(doc) = self.documents.get(&uri.to_string()) else { return Ok(None) };
        Ok(queries::references::references(&uri, &doc.file, position, include_declaration))
    }

    async fn prepare_rename(&self, params: TextDocumentPositionParams) -> Result<Option<PrepareRenameResponse>> {
        let uri = params.text_document.uri.to_string();
        let Some(doc) = self.documents.get(&uri) else { return Ok(None) };
        Ok(queries::rename::prepare_rename(&doc.file, params.position))
    }

    async fn rename(&self, params: RenameParams) -> Result<Option<WorkspaceEdit>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let Some(doc) = self.documents.get(&uri.to_string()) else { return Ok(None) };
        Ok(queries::rename::rename(&uri, &doc.file, position, &params.new_name))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri.to_string();
        let position = params.text_document_position.position;
        let Some(doc) = self.documents.get(&uri) else { return Ok(None) };
        let items = queries::completion::completions(&doc.file, position);
        if items.is_empty() {
            Ok(None)
        } else {
            Ok(Some(CompletionResponse::Array(items)))
        }
    }

    async fn signature_help(&self, params: SignatureHelpParams) -> Result<Option<SignatureHelp>> {
        let uri = params.text_document_position_params.text_document.uri.to_string();
        let position = params.text_document_position_params.position;
        let Some(doc) = self.documents.get(&uri) else { return Ok(None) };
        Ok(queries::signature_help::signature_help(&doc.file, position))
    }

    async fn document_symbol(&self, params: DocumentSymbolParams) -> Result<Option<DocumentSymbolResponse>> {
        let uri = params.text_document.uri.to_string();
        let Some(doc) = self.documents.get(&uri) else { return Ok(None) };
        Ok(Some(DocumentSymbolResponse::Nested(queries::symbols::document_symbols(&doc.file))))
    }

    async fn folding_range(&self, params: FoldingRangeParams) -> Result<Option<Vec<FoldingRange>>> {
        let uri = params.text_document.uri.to_string();
        let Some(doc) = self.documents.get(&uri) else { return Ok(None) };
        Ok(Some(queries::folding::folding_ranges(&doc.file)))
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        let uri = params.text_document.uri;
        let Some(doc) = self.documents.get(&uri.to_string()) else { return Ok(None) };
        let actions = queries::code_actions::code_actions(&uri, &doc.file, &doc.text, params.range, &doc.resolve_errors);
        if actions.is_empty() {
            Ok(None)
        } else {
            Ok(Some(actions))
        }
    }

    async fn semantic_tokens_full(&self, params: SemanticTokensParams) -> Result<Option<SemanticTokensResult>> {
        let uri = params.text_document.uri.to_string();
        let Some(doc) = self.documents.get(&uri) else { return Ok(None) };
        let data = queries::semantic_tokens::semantic_tokens(&doc.text);
        Ok(Some(SemanticTokensResult::Tokens(SemanticTokens {
            result_id: None,
            data,
        })))
    }

    async fn inlay_hint(&self, params: InlayHintParams) -> Result<Option<Vec<InlayHint>>> {
        let uri = params.text_document.uri.to_string();
        let Some(doc) = self.documents.get(&uri) else { return Ok(None) };
        // `inlay_hints` takes a 1-based inclusive visible line range.
        let hints = queries::inlay_hints::inlay_hints(&doc.file, &doc.text, params.range.start.line + 1, params.range.end.line + 1);
        Ok(Some(hints))
    }
}
