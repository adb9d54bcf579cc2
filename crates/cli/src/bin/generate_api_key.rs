//! Generates a gateway API key for benchmark runs.
//!
//! Prints the token (shown only once), its key id and fingerprint, and an
//! `INSERT` statement that seeds the key into the gateway's `api_keys` table.
//! The table stores the key id embedded in the token and the fingerprint,
//! never the token; the key name is recorded in the notes. The token itself is
//! handed to the benchmark runner as `OPENAI_API_KEY`.

use backend::GeneratedKey;
use clap::{Parser, ValueEnum};
use uuid::Uuid;

/// Organisation the benchmark service account belongs to by default.
const MASTER_ADMIN_ORG: &str = "b6fc81af-a245-4599-b3e1-7d2b8745c148";

#[derive(Debug, Parser)]
#[command(name = "generate-api-key")]
#[command(about = "Generate a gateway API key and its fingerprint")]
#[command(version)]
struct Cli {
    /// Organisation that owns the key.
    #[arg(long, default_value = MASTER_ADMIN_ORG)]
    org_id: Uuid,

    /// Principal the key authenticates as. Defaults to the organisation id.
    #[arg(long)]
    principal_id: Option<Uuid>,

    /// Human-readable key name, recorded in the notes.
    #[arg(long, default_value = "guidellm-benchmark-key")]
    key_name: String,

    /// Free-form notes stored with the key.
    #[arg(long, default_value = "API key for guidellm-runner benchmarks")]
    notes: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Where and how the key is recorded.
struct KeyRecord<'a> {
    org_id: Uuid,
    principal_id: Uuid,
    key_name: &'a str,
    notes: &'a str,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let key = GeneratedKey::generate();
    let record = KeyRecord {
        org_id: cli.org_id,
        principal_id: cli.principal_id.unwrap_or(cli.org_id),
        key_name: &cli.key_name,
        notes: &cli.notes,
    };

    match cli.format {
        OutputFormat::Text => print!("{}", render_text(&key, &record)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&render_json(&key, &record))?),
    }
    Ok(())
}

fn render_text(key: &GeneratedKey, record: &KeyRecord<'_>) -> String {
    format!(
        "=== Generated API Key ===\n\
         Token (save this - shown only once):\n{token}\n\n\
         Key ID: {key_id}\n\
         Fingerprint: {fingerprint}\n\n\
         === SQL to insert ===\n{sql}",
        token = key.token().expose(),
        key_id = key.key_id(),
        fingerprint = key.fingerprint(),
        sql = insert_statement(key, record),
    )
}

fn render_json(key: &GeneratedKey, record: &KeyRecord<'_>) -> serde_json::Value {
    serde_json::json!({
        "token": key.token().expose(),
        "key_id": key.key_id(),
        "fingerprint": key.fingerprint(),
        "org_id": record.org_id,
        "principal_id": record.principal_id,
        "key_name": record.key_name,
        "sql": insert_statement(key, record),
    })
}

/// Builds the seeding statement. The key is stored by key id and fingerprint;
/// the notes read `<key name>: <notes>`.
fn insert_statement(key: &GeneratedKey, record: &KeyRecord<'_>) -> String {
    format!(
        "INSERT INTO api_keys (\n    \
             org_id,\n    \
             principal_type,\n    \
             principal_id,\n    \
             fingerprint,\n    \
             status,\n    \
             scopes,\n    \
             key_id,\n    \
             notes\n\
         ) VALUES (\n    \
             '{org_id}',\n    \
             'user',\n    \
             '{principal_id}',\n    \
             '{fingerprint}',\n    \
             'active',\n    \
             '[\"*\"]',\n    \
             '{key_id}',\n    \
             '{key_name}: {notes}'\n\
         );\n",
        org_id = record.org_id,
        principal_id = record.principal_id,
        fingerprint = key.fingerprint(),
        key_id = key.key_id(),
        key_name = sql_escape(record.key_name),
        notes = sql_escape(record.notes),
    )
}

fn sql_escape(value: &str) -> String {
    value.replace('\'', "''")
}
