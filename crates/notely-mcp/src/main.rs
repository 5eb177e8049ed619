use notely_core::export::notes_to_csv;
use notely_core::settings::{self, ImageSettings, Settings};
use notely_core::view::{sort_notes, SortOrder};
use notely_core::{NoteId, NoteQuery, Notes, OwnerId, Session};
use notely_imagine::DataUrl;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use time::UtcOffset;
use tracing::{info, warn};

const DEFAULT_WAIT_MS: u64 = 30_000;
const MAX_WAIT_MS: u64 = 300_000;
const IMAGES_DIR: &str = "images";

// --- Request types ---

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct ListNotesRequest {
    /// "all" (default), "completed" or "incomplete". Unknown values mean "all".
    filter: Option<String>,
    /// Group label to match exactly, or "no_group" for notes without a group.
    group: Option<String>,
    /// Display order; defaults to newest first.
    sort: Option<SortOrder>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct CreateNoteRequest {
    /// Note text. Trimmed; must not be blank.
    content: String,
    /// Optional group label. Blank means no group.
    group: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct UpdateNoteRequest {
    /// ID of the note to edit
    id: i64,
    /// Replacement text. Trimmed; must not be blank.
    content: String,
    /// Omit to keep the current group, "" to clear it, or a new label.
    group: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct NoteIdRequest {
    /// ID of the note
    id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct RenameGroupRequest {
    /// Current group label (exact match)
    old_name: String,
    /// New group label. Trimmed; must not be blank.
    new_name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct ExportCsvRequest {
    filter: Option<String>,
    group: Option<String>,
    sort: Option<SortOrder>,
    /// Write the CSV to this file instead of returning it.
    path: Option<String>,
    /// Offset from UTC in minutes for the "Created At" column. Defaults to the server's local offset.
    utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct WaitForChangesRequest {
    filter: Option<String>,
    group: Option<String>,
    sort: Option<SortOrder>,
    /// How long to wait in milliseconds (default 30000, max 300000).
    timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct GenerateImageRequest {
    /// What to illustrate
    prompt: String,
    /// Save the image under the data directory's images/ folder with this file name
    /// instead of returning the data URL.
    save_as: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct SaveImageSettingsRequest {
    /// API key. Empty or omitted keeps the existing key.
    api_key: Option<String>,
    model: Option<String>,
    api_url: Option<String>,
    /// Sent as the HTTP-Referer header. Empty clears it.
    referer: Option<String>,
    /// Sent as the X-Title header
    title: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WaitOutcome {
    changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<Vec<notely_core::Note>>,
}

// --- Server ---

#[derive(Clone)]
pub struct NotelyServer {
    tool_router: ToolRouter<Self>,
    notes: Arc<Notes>,
    session: Session,
    settings: Arc<Mutex<Settings>>,
    data_dir: PathBuf,
    local_offset: UtcOffset,
}

#[tool_router]
impl NotelyServer {
    pub fn new(
        notes: Arc<Notes>,
        session: Session,
        settings: Settings,
        data_dir: PathBuf,
        local_offset: UtcOffset,
    ) -> Self {
        Self {
            tool_router: Self::tool_router(),
            notes,
            session,
            settings: Arc::new(Mutex::new(settings)),
            data_dir,
            local_offset,
        }
    }

    fn settings(&self) -> Settings {
        self.settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn sorted(&self, query: &NoteQuery, sort: Option<SortOrder>) -> Result<Vec<notely_core::Note>, String> {
        let mut notes = self.notes.list(&self.session, query).map_err(|e| e.to_string())?;
        sort_notes(&mut notes, sort.unwrap_or_default());
        Ok(notes)
    }

    #[tool(
        description = "List the caller's notes. Returns [{id, authorId, content, completed, group?, createdAtMs}]. Anonymous callers get an empty list."
    )]
    fn list_notes(
        &self,
        Parameters(req): Parameters<ListNotesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let query = NoteQuery::new(req.filter.as_deref(), req.group.as_deref());
        match self.sorted(&query, req.sort) {
            Ok(notes) => json_result(&notes),
            Err(e) => tool_error(e),
        }
    }

    #[tool(description = "Create a note, optionally in a group. Returns the new note's id.")]
    fn create_note(
        &self,
        Parameters(req): Parameters<CreateNoteRequest>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .notes
            .create(&self.session, &req.content, req.group.as_deref())
        {
            Ok(id) => json_result(&serde_json::json!({ "id": id })),
            Err(e) => tool_error(e),
        }
    }

    #[tool(
        description = "Replace a note's text. The group is kept when omitted, cleared when empty, otherwise replaced."
    )]
    fn update_note(
        &self,
        Parameters(req): Parameters<UpdateNoteRequest>,
    ) -> Result<CallToolResult, McpError> {
        let id = NoteId(req.id);
        match self
            .notes
            .update(&self.session, id, &req.content, req.group.as_deref())
        {
            Ok(()) => Ok(CallToolResult::success(vec![Content::text(format!(
                "Updated note {id}"
            ))])),
            Err(e) => tool_error(e),
        }
    }

    #[tool(description = "Delete one of the caller's notes")]
    fn delete_note(
        &self,
        Parameters(req): Parameters<NoteIdRequest>,
    ) -> Result<CallToolResult, McpError> {
        let id = NoteId(req.id);
        match self.notes.remove(&self.session, id) {
            Ok(()) => Ok(CallToolResult::success(vec![Content::text(format!(
                "Deleted note {id}"
            ))])),
            Err(e) => tool_error(e),
        }
    }

    #[tool(description = "Flip a note between completed and not completed. Returns the new state.")]
    fn toggle_completed(
        &self,
        Parameters(req): Parameters<NoteIdRequest>,
    ) -> Result<CallToolResult, McpError> {
        let id = NoteId(req.id);
        match self.notes.toggle_completed(&self.session, id) {
            Ok(completed) => json_result(&serde_json::json!({ "id": id, "completed": completed })),
            Err(e) => tool_error(e),
        }
    }

    #[tool(description = "List the distinct group labels used by the caller's notes, sorted")]
    fn list_groups(&self) -> Result<CallToolResult, McpError> {
        match self.notes.list_groups(&self.session) {
            Ok(groups) => json_result(&groups),
            Err(e) => tool_error(e),
        }
    }

    #[tool(
        description = "Rename a group: every caller-owned note labelled old_name is relabelled new_name in one transaction. Returns how many notes changed."
    )]
    fn rename_group(
        &self,
        Parameters(req): Parameters<RenameGroupRequest>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .notes
            .rename_group(&self.session, &req.old_name, &req.new_name)
        {
            Ok(renamed) => json_result(&serde_json::json!({ "renamed": renamed })),
            Err(e) => tool_error(e),
        }
    }

    #[tool(
        description = "Export the filtered, sorted notes as CSV (UTF-8 with BOM; columns No, Content, Status, Group, Created At). Returns the text, or writes it to `path`."
    )]
    fn export_csv(
        &self,
        Parameters(req): Parameters<ExportCsvRequest>,
    ) -> Result<CallToolResult, McpError> {
        let offset = match req.utc_offset_minutes {
            Some(minutes) => match offset_from_minutes(minutes) {
                Ok(offset) => offset,
                Err(e) => return tool_error(e),
            },
            None => self.local_offset,
        };
        let query = NoteQuery::new(req.filter.as_deref(), req.group.as_deref());
        let notes = match self.sorted(&query, req.sort) {
            Ok(notes) => notes,
            Err(e) => return tool_error(e),
        };
        let csv = match notes_to_csv(&notes, offset) {
            Ok(csv) => csv,
            Err(e) => return tool_error(e),
        };

        let Some(path) = req.path else {
            return Ok(CallToolResult::success(vec![Content::text(csv)]));
        };
        match std::fs::write(&path, csv) {
            Ok(()) => {
                info!(path = %path, count = notes.len(), "notes exported");
                Ok(CallToolResult::success(vec![Content::text(format!(
                    "Exported {} notes to {path}",
                    notes.len()
                ))]))
            }
            Err(e) => tool_error(format!("Failed to write {path}: {e}")),
        }
    }

    #[tool(
        description = "Wait until the caller's notes change, then return the refreshed list for the given filter and sort. Returns {changed: false} if nothing changed before the timeout."
    )]
    async fn wait_for_changes(
        &self,
        Parameters(req): Parameters<WaitForChangesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let query = NoteQuery::new(req.filter.as_deref(), req.group.as_deref());
        let mut live = self.notes.watch(&self.session, query);
        let wait = clamp_wait(req.timeout_ms);

        match tokio::time::timeout(wait, self.notes.next_snapshot(&mut live)).await {
            Err(_) => json_result(&WaitOutcome {
                changed: false,
                notes: None,
            }),
            Ok(Err(e)) => tool_error(e),
            Ok(Ok(mut notes)) => {
                sort_notes(&mut notes, req.sort.unwrap_or_default());
                json_result(&WaitOutcome {
                    changed: true,
                    notes: Some(notes),
                })
            }
        }
    }

    #[tool(
        description = "Generate an illustration for a prompt via the configured image API. Returns a data:image URL, or saves the image to the data directory when save_as is given."
    )]
    async fn generate_image(
        &self,
        Parameters(req): Parameters<GenerateImageRequest>,
    ) -> Result<CallToolResult, McpError> {
        let image_settings = self.settings().image;
        let target = match req.save_as.as_deref().map(validate_file_name).transpose() {
            Ok(target) => target,
            Err(e) => return tool_error(e),
        };

        let url = match notely_imagine::generate_image(&self.session, &image_settings, &req.prompt).await {
            Ok(url) => url,
            Err(e) => return tool_error(e),
        };
        let Some(name) = target else {
            return Ok(CallToolResult::success(vec![Content::text(url)]));
        };

        match save_image(&self.data_dir, name, &url) {
            Ok(path) => json_result(&serde_json::json!({ "path": path.display().to_string() })),
            Err(e) => tool_error(e),
        }
    }

    #[tool(description = "Show the caller identity and image generation settings. The API key is never returned.")]
    fn get_settings(&self) -> Result<CallToolResult, McpError> {
        let settings = self.settings();
        json_result(&masked_settings(&settings, &self.session, &self.data_dir))
    }

    #[tool(description = "Update and persist image generation settings. An empty api_key keeps the existing key.")]
    fn save_image_settings(
        &self,
        Parameters(req): Parameters<SaveImageSettingsRequest>,
    ) -> Result<CallToolResult, McpError> {
        // Persist on top of the file, not the env-overridden copy in memory.
        let mut stored = Settings::read(&self.data_dir);
        apply_image_update(&mut stored.image, &req);
        if let Err(e) = stored.write(&self.data_dir) {
            return tool_error(format!("Failed to save settings: {e}"));
        }

        let mut current = self.settings.lock().unwrap_or_else(PoisonError::into_inner);
        apply_image_update(&mut current.image, &req);
        info!(model = %current.image.model, "image settings saved");
        json_result(&masked_settings(&current, &self.session, &self.data_dir))
    }
}

#[tool_handler]
impl ServerHandler for NotelyServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// --- Helpers ---

fn tool_error(e: impl Display) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
}

fn json_result<T: Serialize + ?Sized>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn clamp_wait(timeout_ms: Option<u64>) -> Duration {
    Duration::from_millis(timeout_ms.unwrap_or(DEFAULT_WAIT_MS).min(MAX_WAIT_MS))
}

fn offset_from_minutes(minutes: i32) -> Result<UtcOffset, String> {
    UtcOffset::from_whole_seconds(minutes.saturating_mul(60))
        .map_err(|_| format!("UTC offset out of range: {minutes} minutes"))
}

/// A bare file name: no directories, no parent references.
fn validate_file_name(name: &str) -> Result<&str, String> {
    let name = name.trim();
    let bare = Path::new(name)
        .file_name()
        .is_some_and(|f| f == std::ffi::OsStr::new(name));
    if name.is_empty() || name.starts_with('.') || !bare || name.contains(['/', '\\']) {
        return Err(format!("Invalid file name '{name}'"));
    }
    Ok(name)
}

fn image_file_name(name: &str, data: &DataUrl) -> String {
    if Path::new(name).extension().is_some() {
        name.to_string()
    } else {
        format!("{name}.{}", data.extension())
    }
}

fn save_image(data_dir: &Path, name: &str, url: &str) -> Result<PathBuf, String> {
    let data = DataUrl::parse(url).map_err(|e| e.to_string())?;
    let dir = data_dir.join(IMAGES_DIR);
    std::fs::create_dir_all(&dir).map_err(|e| format!("Failed to create {}: {e}", dir.display()))?;
    let path = dir.join(image_file_name(name, &data));
    std::fs::write(&path, &data.bytes).map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
    info!(path = %path.display(), bytes = data.bytes.len(), "image saved");
    Ok(path)
}

fn masked_settings(settings: &Settings, session: &Session, data_dir: &Path) -> serde_json::Value {
    serde_json::json!({
        "user": session.user().map(OwnerId::as_str),
        "dataDir": data_dir.display().to_string(),
        "image": {
            "model": settings.image.model,
            "apiUrl": settings.image.api_url,
            "referer": settings.image.referer,
            "title": settings.image.title,
            "hasKey": !settings.image.api_key.is_empty(),
            "configured": settings.image.configured(),
        },
    })
}

fn apply_image_update(image: &mut ImageSettings, req: &SaveImageSettingsRequest) {
    if let Some(key) = req.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        image.api_key = key.trim().to_string();
    }
    if let Some(model) = req.model.as_deref().filter(|m| !m.trim().is_empty()) {
        image.model = model.trim().to_string();
    }
    if let Some(url) = req.api_url.as_deref().filter(|u| !u.trim().is_empty()) {
        image.api_url = url.trim().to_string();
    }
    if let Some(referer) = req.referer.as_deref() {
        let referer = referer.trim();
        image.referer = (!referer.is_empty()).then(|| referer.to_string());
    }
    if let Some(title) = req.title.as_deref().filter(|t| !t.trim().is_empty()) {
        image.title = title.trim().to_string();
    }
}

// --- Command line ---

#[derive(Debug, Default, PartialEq)]
struct Cli {
    user: Option<String>,
    data_dir: Option<PathBuf>,
    help: bool,
    version: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Cli, String> {
    let mut cli = Cli::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => cli.help = true,
            "-V" | "--version" => cli.version = true,
            "--user" => cli.user = Some(args.next().ok_or("--user needs a value")?),
            "--data-dir" => {
                cli.data_dir = Some(PathBuf::from(args.next().ok_or("--data-dir needs a value")?))
            }
            other => {
                if let Some(user) = other.strip_prefix("--user=") {
                    cli.user = Some(user.to_string());
                } else if let Some(dir) = other.strip_prefix("--data-dir=") {
                    cli.data_dir = Some(PathBuf::from(dir));
                } else {
                    return Err(format!("unknown argument: {other}"));
                }
            }
        }
    }
    Ok(cli)
}

/// `--user` beats `NOTELY_USER`, which beats the settings file.
fn resolve_session(cli_user: Option<&str>, settings: &Settings) -> Result<Session, notely_core::OwnerIdError> {
    match cli_user {
        Some(user) => Ok(Session::authenticated(OwnerId::try_new(user)?)),
        None => settings.session(),
    }
}

const USAGE: &str = "Usage: notely-mcp [--user ID] [--data-dir DIR]

Serves Notely notes over MCP on stdin/stdout.

Options:
  --user ID         Act as this user (default: $NOTELY_USER, then settings.json)
  --data-dir DIR    Where notes.db and settings.json live (default: $NOTELY_HOME or ~/.notely)
  -h, --help        Print this help
  -V, --version     Print the version";

const INSTRUCTIONS: &str = r#"Notely is a personal note store. Every tool acts as the configured user; without one, lists are empty and writes are rejected with "Must be logged in to ...".

## Notes
- A note has an id, content, a completed flag, an optional group label and a creation time.
- list_notes filters by status ("all", "completed", "incomplete") and group (an exact label, or "no_group" for ungrouped notes) and sorts by "newest", "oldest", "content_asc" or "content_desc".
- update_note: omit `group` to keep it, pass "" to clear it.
- rename_group relabels every note in a group at once.

## Other tools
- export_csv returns the current view as CSV or writes it to a file.
- wait_for_changes blocks until the notes change and returns the refreshed list.
- generate_image needs an API key (OPENROUTER_API_KEY or save_image_settings)."#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = parse_args(std::env::args().skip(1)).map_err(|e| format!("{e}\n\n{USAGE}"))?;
    if cli.help {
        println!("{USAGE}");
        return Ok(());
    }
    if cli.version {
        println!("notely-mcp {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let data_dir = cli.data_dir.clone().unwrap_or_else(settings::data_dir);
    let config = Settings::load(&data_dir);
    let session = resolve_session(cli.user.as_deref(), &config)?;
    let local_offset = UtcOffset::current_local_offset().unwrap_or_else(|_| {
        warn!("local UTC offset unavailable, exporting times in UTC");
        UtcOffset::UTC
    });

    let notes = Arc::new(Notes::open(&data_dir)?);
    match session.user() {
        Some(user) => info!(user = %user, data_dir = %data_dir.display(), "notely-mcp starting"),
        None => warn!(data_dir = %data_dir.display(), "no user configured, serving read-only anonymous session"),
    }

    let service = NotelyServer::new(notes, session, config, data_dir, local_offset)
        .serve(rmcp::transport::io::stdio())
        .await
        .inspect_err(|e| tracing::error!("MCP server error: {e}"))?;
    service.waiting().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_flags_and_values() {
        let cli = parse_args(args(&["--user", "alice", "--data-dir=/tmp/n"])).unwrap();
        assert_eq!(cli.user.as_deref(), Some("alice"));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/n")));
        assert!(!cli.help);

        let cli = parse_args(args(&["-h", "-V"])).unwrap();
        assert!(cli.help && cli.version);
        assert_eq!(parse_args(Vec::new()).unwrap(), Cli::default());
    }

    #[test]
    fn rejects_unknown_or_incomplete_arguments() {
        assert!(parse_args(args(&["--user"])).is_err());
        assert!(parse_args(args(&["--verbose"])).is_err());
    }

    #[test]
    fn cli_user_wins_over_settings() {
        let settings = Settings {
            user: Some("from-settings".to_string()),
            ..Settings::default()
        };
        let session = resolve_session(Some("cli"), &settings).unwrap();
        assert_eq!(session.user().map(OwnerId::as_str), Some("cli"));

        let session = resolve_session(None, &settings).unwrap();
        assert_eq!(session.user().map(OwnerId::as_str), Some("from-settings"));

        assert!(!resolve_session(None, &Settings::default()).unwrap().is_authenticated());
        assert!(resolve_session(Some("  "), &settings).is_err());
    }

    #[test]
    fn wait_timeout_defaults_and_caps() {
        assert_eq!(clamp_wait(None), Duration::from_secs(30));
        assert_eq!(clamp_wait(Some(250)), Duration::from_millis(250));
        assert_eq!(clamp_wait(Some(10_000_000)), Duration::from_secs(300));
    }

    #[test]
    fn image_file_names_stay_inside_the_images_dir() {
        assert_eq!(validate_file_name(" fox ").unwrap(), "fox");
        for bad in ["", "  ", "../fox", "a/b.png", "a\\b", ".hidden", ".."] {
            assert!(validate_file_name(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn extension_comes_from_mime_unless_given() {
        let jpeg = DataUrl::parse("data:image/jpeg;base64,aGVsbG8=").unwrap();
        assert_eq!(image_file_name("fox", &jpeg), "fox.jpg");
        assert_eq!(image_file_name("fox.png", &jpeg), "fox.png");
    }

    #[test]
    fn saved_image_lands_in_images_dir() {
        let dir = std::env::temp_dir().join(format!(
            "notely_mcp_saved_image_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        let path = save_image(&dir, "hello", "data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(path, dir.join("images").join("hello.png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
        assert!(save_image(&dir, "bad", "not a data url").is_err());
    }

    #[test]
    fn settings_update_keeps_key_when_blank_and_clears_referer() {
        let mut image = ImageSettings {
            api_key: "secret".to_string(),
            referer: Some("https://notely.app".to_string()),
            ..ImageSettings::default()
        };
        apply_image_update(
            &mut image,
            &SaveImageSettingsRequest {
                api_key: Some(String::new()),
                model: Some("other/model".to_string()),
                api_url: None,
                referer: Some(String::new()),
                title: None,
            },
        );
        assert_eq!(image.api_key, "secret");
        assert_eq!(image.model, "other/model");
        assert_eq!(image.referer, None);
        assert_eq!(image.api_url, settings::DEFAULT_IMAGE_API_URL);
    }

    #[test]
    fn masked_settings_never_expose_the_key() {
        let settings = Settings {
            image: ImageSettings {
                api_key: "secret".to_string(),
                ..ImageSettings::default()
            },
            ..Settings::default()
        };
        let json = masked_settings(&settings, &Session::anonymous(), Path::new("/tmp/n"));
        assert!(!json.to_string().contains("secret"));
        assert_eq!(json["image"]["hasKey"], true);
        assert_eq!(json["user"], serde_json::Value::Null);
    }

    #[test]
    fn offsets_in_minutes() {
        assert_eq!(offset_from_minutes(420).unwrap(), UtcOffset::from_hms(7, 0, 0).unwrap());
        assert!(offset_from_minutes(26 * 60).is_err());
    }
}
