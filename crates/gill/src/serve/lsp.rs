//! LSP (Language Server Protocol) server for gill.
//!
//! Publishes `fish -n` syntax errors as diagnostics and serves
//! `fish_indent` as the document formatter.

use super::{Debouncer, Document, DocumentStore, full_document_range, is_fish_document};
use crate::config::GillConfig;
use gill_core::Merge;
use gill_tools::{Tool, ToolError, ToolRegistry, ToolResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};

/// What caused a lint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LintTrigger {
    Open,
    Save,
    Change,
}

/// What to hand to `fish -n`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LintTarget {
    /// The file on disk, by path.
    File(PathBuf),
    /// The buffer contents on stdin, labelled with `label`.
    Buffer { text: String, label: PathBuf },
}

impl LintTarget {
    /// Lint the saved file when the buffer has no unsaved edits, else the buffer.
    fn choose(uri: &Url, doc: &Document, trigger: LintTrigger) -> Self {
        if trigger != LintTrigger::Change
            && !doc.dirty
            && let Ok(path) = uri.to_file_path()
            && path.is_file()
        {
            return LintTarget::File(path);
        }
        LintTarget::Buffer {
            text: doc.text.clone(),
            label: Document::label(uri),
        }
    }

    fn run(&self, linter: &dyn Tool) -> std::result::Result<ToolResult, ToolError> {
        match self {
            LintTarget::File(path) => {
                let root = path.parent().unwrap_or_else(|| Path::new("."));
                linter.run(&[path.as_path()], root)
            }
            LintTarget::Buffer { text, label } => linter.check_source(text, label),
        }
    }
}

/// State shared between request handlers and background lint tasks.
struct Shared {
    client: Client,
    documents: DocumentStore,
    debouncer: Debouncer<Url>,
    /// Config from files, before client settings are layered on.
    file_config: RwLock<GillConfig>,
    config: RwLock<GillConfig>,
    registry: RwLock<ToolRegistry>,
}

impl Shared {
    /// Apply client settings on top of file config and rebuild the tools.
    async fn apply_client_settings(&self, settings: Option<&serde_json::Value>) {
        let base = self.file_config.read().await.clone();
        let merged = match settings.map(GillConfig::from_client_settings) {
            Some(Ok(client)) => base.merge(client),
            Some(Err(e)) => {
                tracing::warn!("{e}");
                self.client
                    .show_message(MessageType::WARNING, format!("gill: {e}"))
                    .await;
                base
            }
            None => base,
        };
        *self.registry.write().await = ToolRegistry::from_config(&merged.tools.to_tools_config());
        *self.config.write().await = merged;
    }

    async fn lint_after_debounce(&self, uri: Url, ticket: super::Ticket, trigger: LintTrigger) {
        let delay = self.config.read().await.lint.debounce();
        if !self.debouncer.settle(&uri, ticket, delay).await {
            tracing::trace!(%uri, "lint superseded before start");
            return;
        }
        let Some(doc) = self.documents.get(&uri) else {
            return;
        };
        let Some(linter) = self.registry.read().await.linter() else {
            return;
        };

        let target = LintTarget::choose(&uri, &doc, trigger);
        tracing::debug!(%uri, ?trigger, version = doc.version, "linting");
        let outcome = tokio::task::spawn_blocking(move || target.run(linter.as_ref())).await;

        if !self.debouncer.is_current(&uri, ticket) {
            tracing::debug!(%uri, "dropping superseded lint result");
            return;
        }

        match outcome {
            Ok(Ok(result)) => {
                let diagnostics = result
                    .diagnostics
                    .iter()
                    .map(|d| super::to_lsp_diagnostic(d, &doc.text))
                    .collect();
                self.client
                    .publish_diagnostics(uri, diagnostics, Some(doc.version))
                    .await;
            }
            Ok(Err(e)) => {
                tracing::warn!(%uri, "lint failed: {e}");
                self.client
                    .show_message(MessageType::ERROR, format!("fish lint failed: {e}"))
                    .await;
                self.client.publish_diagnostics(uri, Vec::new(), None).await;
            }
            Err(e) => tracing::error!(%uri, "lint task failed: {e}"),
        }
    }
}

/// gill LSP backend.
pub(crate) struct GillBackend {
    shared: Arc<Shared>,
    /// Root given on the command line; the client's workspace wins.
    cli_root: Option<PathBuf>,
}

impl GillBackend {
    pub(crate) fn new(client: Client, cli_root: Option<PathBuf>) -> Self {
        Self {
            shared: Arc::new(Shared {
                client,
                documents: DocumentStore::new(),
                debouncer: Debouncer::new(),
                file_config: RwLock::new(GillConfig::default()),
                config: RwLock::new(GillConfig::default()),
                registry: RwLock::new(ToolRegistry::default()),
            }),
            cli_root,
        }
    }

    fn workspace_root(&self, params: &InitializeParams) -> PathBuf {
        if let Some(root_uri) = &params.root_uri
            && let Ok(path) = root_uri.to_file_path()
        {
            return path;
        }
        if let Some(folders) = &params.workspace_folders
            && let Some(folder) = folders.first()
            && let Ok(path) = folder.uri.to_file_path()
        {
            return path;
        }
        self.cli_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Debounce a lint of `uri`; earlier pending lints of it are superseded.
    fn schedule_lint(&self, uri: Url, trigger: LintTrigger) {
        let ticket = self.shared.debouncer.ticket(&uri);
        let shared = self.shared.clone();
        tokio::spawn(async move { shared.lint_after_debounce(uri, ticket, trigger).await });
    }

    async fn should_lint(&self, uri: &Url, trigger: LintTrigger) -> bool {
        let Some(doc) = self.shared.documents.get(uri) else {
            return false;
        };
        if !is_fish_document(uri, &doc.language_id) {
            return false;
        }
        let config = self.shared.config.read().await;
        let lint = &config.lint;
        match trigger {
            LintTrigger::Open => lint.on_open(),
            LintTrigger::Save => lint.on_save(),
            LintTrigger::Change => lint.on_change(),
        }
    }

    async fn maybe_lint(&self, uri: Url, trigger: LintTrigger) {
        if self.should_lint(&uri, trigger).await {
            self.schedule_lint(uri, trigger);
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for GillBackend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let root = self.workspace_root(&params);
        tracing::info!(root = %root.display(), "initializing");
        *self.shared.file_config.write().await = GillConfig::load(&root);
        self.shared
            .apply_client_settings(params.initialization_options.as_ref())
            .await;

        let format_enabled = self.shared.config.read().await.format.enabled();

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::FULL),
                        save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                            include_text: Some(true),
                        })),
                        ..Default::default()
                    },
                )),
                document_formatting_provider: Some(OneOf::Left(format_enabled)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "gill".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.shared
            .client
            .log_message(MessageType::INFO, "gill language server initialized")
            .await;

        let registry = self.shared.registry.read().await.clone();
        for tool in registry.tools() {
            if !tool.is_available() {
                let msg = format!(
                    "{} not found (looked for {}); set [tools] in .gill/config.toml",
                    tool.info().name,
                    tool.executable().display()
                );
                tracing::warn!("{msg}");
                self.shared
                    .client
                    .show_message(MessageType::WARNING, msg)
                    .await;
            }
        }
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        self.shared
            .documents
            .open(doc.uri.clone(), doc.text, doc.version, doc.language_id);
        self.maybe_lint(doc.uri, LintTrigger::Open).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        // Full sync: the last change carries the whole document.
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };
        self.shared
            .documents
            .change(&uri, change.text, params.text_document.version);
        self.maybe_lint(uri, LintTrigger::Change).await;
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;
        self.shared.documents.saved(&uri, params.text);
        self.maybe_lint(uri, LintTrigger::Save).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.shared.debouncer.cancel(&uri);
        if self.shared.documents.close(&uri).is_some() {
            self.shared
                .client
                .publish_diagnostics(uri, Vec::new(), None)
                .await;
        }
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        self.shared
            .apply_client_settings(Some(&params.settings))
            .await;
        tracing::info!("configuration updated");
    }

    async fn formatting(&self, params: DocumentFormattingParams) -> Result<Option<Vec<TextEdit>>> {
        let uri = params.text_document.uri;
        if !self.shared.config.read().await.format.enabled() {
            return Ok(None);
        }
        let Some(doc) = self.shared.documents.get(&uri) else {
            return Ok(None);
        };
        if !is_fish_document(&uri, &doc.language_id) {
            return Ok(None);
        }
        let Some(formatter) = self.shared.registry.read().await.formatter() else {
            return Ok(None);
        };

        let source = doc.text.clone();
        let formatted = tokio::task::spawn_blocking(move || formatter.format_source(&source))
            .await
            .map_err(|e| {
                tracing::error!(%uri, "format task failed: {e}");
                Error::internal_error()
            })?;

        let formatted = match formatted {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(%uri, "format failed: {e}");
                self.shared
                    .client
                    .show_message(MessageType::ERROR, format!("fish_indent failed: {e}"))
                    .await;
                return Ok(None);
            }
        };

        // The buffer moved on, or was closed or reopened, while fish_indent ran.
        if !self.shared.documents.is_current(&uri, &doc) {
            tracing::debug!(%uri, "dropping stale format result");
            return Ok(None);
        }

        Ok(Some(whole_document_edits(&doc.text, formatted)))
    }
}

/// Edits turning `original` into `formatted`: nothing, or one full replacement.
fn whole_document_edits(original: &str, formatted: String) -> Vec<TextEdit> {
    if formatted == original {
        return Vec::new();
    }
    vec![TextEdit {
        range: full_document_range(original),
        new_text: formatted,
    }]
}

/// Start the LSP server on stdio.
pub async fn run_lsp_server(root: Option<&Path>) -> i32 {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let cli_root = root.map(Path::to_path_buf);
    let (service, socket) = LspService::new(move |client| GillBackend::new(client, cli_root));

    Server::new(stdin, stdout, socket).serve(service).await;
    0
}
