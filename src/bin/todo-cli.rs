use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "todo-cli")]
#[command(about = "Command line client for the todo service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the service is up
    Health,
    /// Create a todo
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        /// Due date in epoch milliseconds
        #[arg(long, conflicts_with = "due_in_minutes")]
        due: Option<i64>,
        /// Due date relative to now
        #[arg(long, default_value_t = 60)]
        due_in_minutes: i64,
    },
    /// Count todos by status (ALL, PENDING, LATE, DONE)
    Count {
        #[arg(long, default_value = "ALL")]
        status: String,
    },
    /// List todos
    List {
        #[arg(long, default_value = "ALL")]
        status: String,
        /// ID, DUE_DATE or TITLE
        #[arg(long, default_value = "ID")]
        sort_by: String,
    },
    /// Change the status of a todo
    Update {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        status: String,
    },
    /// Delete a todo
    Delete {
        #[arg(long)]
        id: u64,
    },
    /// Show a log channel's level (request-logger or todo-logger)
    GetLevel { logger: String },
    /// Change a log channel's level (DEBUG, INFO or ERROR)
    SetLevel { logger: String, level: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Health => client.get(format!("{}/todo/health", base)).send().await?,
        Commands::Create {
            title,
            content,
            due,
            due_in_minutes,
        } => {
            let due_date = due.unwrap_or_else(|| {
                chrono::Utc::now().timestamp_millis() + due_in_minutes * 60_000
            });
            client
                .post(format!("{}/todo", base))
                .json(&json!({ "title": title, "content": content, "dueDate": due_date }))
                .send()
                .await?
        }
        Commands::Count { status } => {
            client
                .get(format!("{}/todo/size", base))
                .query(&[("status", status)])
                .send()
                .await?
        }
        Commands::List { status, sort_by } => {
            client
                .get(format!("{}/todo/content", base))
                .query(&[("status", status), ("sortBy", sort_by)])
                .send()
                .await?
        }
        Commands::Update { id, status } => {
            client
                .put(format!("{}/todo", base))
                .query(&[("id", id.to_string()), ("status", status)])
                .send()
                .await?
        }
        Commands::Delete { id } => {
            client
                .delete(format!("{}/todo", base))
                .query(&[("id", id.to_string())])
                .send()
                .await?
        }
        Commands::GetLevel { logger } => {
            client
                .get(format!("{}/logs/level", base))
                .query(&[("logger-name", logger)])
                .send()
                .await?
        }
        Commands::SetLevel { logger, level } => {
            client
                .put(format!("{}/logs/level", base))
                .query(&[("logger-name", logger), ("logger-level", level)])
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    let rendered = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{}", rendered);
    } else {
        eprintln!("Error: service returned status {}", status);
        eprintln!("{}", rendered);
    }
    Ok(())
}
