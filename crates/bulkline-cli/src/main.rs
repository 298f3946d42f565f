use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use tracing::warn;

use bulkline_client::{ApiClient, BlobClient, RemoteConfig, blob::MESSAGES_PREFIX};
use bulkline_db::Store;
use bulkline_send::{AttachmentSet, BulkSender, resolve, template};
use bulkline_services::{ContactsService, HistoryService, OrdersService, ScheduledService};

const USAGE: &str = "usage: bulkline <command>

commands:
  contacts                         list the roster (remote when configured)
  add-contact <name> <phone> [tags]  create a contact; tags comma-separated
  templates                        list builtin message templates
  send --to <id,id,..> [options]   send a bulk message now (or schedule it)
      --message <text>             message body ({name}/{phone}/{date}/{time})
      --template <id>              replace the body with a builtin template
      --image <path>               attach an image (repeatable)
      --at <rfc3339>               park the message for later instead
  history                          show the send log, newest first
  scheduled [--due]                show parked messages
  orders                           show the orders book
  images                           list uploaded message images";

struct App {
    store: Arc<Store>,
    api: Option<ApiClient>,
    blob: Option<BlobClient>,
}

impl App {
    fn init() -> Result<Self> {
        let db_path: PathBuf = std::env::var("BULKLINE_DB_PATH")
            .unwrap_or_else(|_| "bulkline.db".into())
            .into();
        let store = Arc::new(Store::open(&db_path)?);

        let remote = RemoteConfig::from_env();
        if remote.is_none() {
            warn!("BULKLINE_API_BASE / BULKLINE_API_KEY not set; running local-only");
        }
        let api = remote.as_ref().map(ApiClient::new);
        let blob = remote.as_ref().map(BlobClient::new);

        Ok(Self { store, api, blob })
    }

    fn contacts(&self) -> ContactsService {
        ContactsService::new(self.api.clone(), self.store.clone())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bulkline=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{}", USAGE);
        return Ok(());
    };

    let app = App::init()?;

    match command.as_str() {
        "contacts" => list_contacts(&app).await,
        "add-contact" => add_contact(&app, &args[1..]).await,
        "templates" => {
            list_templates();
            Ok(())
        }
        "send" => send(&app, &args[1..]).await,
        "history" => history(&app),
        "scheduled" => scheduled(&app, &args[1..]),
        "orders" => orders(&app),
        "images" => images(&app).await,
        other => {
            println!("{}", USAGE);
            bail!("unknown command: {}", other);
        }
    }
}

async fn list_contacts(app: &App) -> Result<()> {
    let roster = app.contacts().list().await?;
    if roster.is_empty() {
        println!("no contacts");
        return Ok(());
    }
    for c in &roster {
        println!("{}  {:<20} {:<15} [{}]", c.id, c.name, c.phone, c.tags.join(", "));
    }
    println!("{} contacts", roster.len());
    Ok(())
}

async fn add_contact(app: &App, args: &[String]) -> Result<()> {
    let [name, phone, rest @ ..] = args else {
        bail!("usage: bulkline add-contact <name> <phone> [tags]");
    };
    let tags = rest
        .first()
        .map(|t| t.split(',').map(|s| s.trim().to_string()).collect())
        .unwrap_or_default();
    let contact = app.contacts().add(name, phone, tags).await?;
    println!("added {} ({})", contact.name, contact.id);
    Ok(())
}

fn list_templates() {
    for t in template::TEMPLATES {
        println!("{}  {:<20} [{}]\n    {}", t.id, t.name, t.category, t.body);
    }
}

struct SendArgs {
    to: Vec<String>,
    message: String,
    images: Vec<PathBuf>,
    at: Option<DateTime<Utc>>,
}

fn parse_send_args(args: &[String]) -> Result<SendArgs> {
    let mut to = Vec::new();
    let mut message = String::new();
    let mut images = Vec::new();
    let mut at = None;

    let mut it = args.iter();
    while let Some(flag) = it.next() {
        let mut value = || {
            it.next()
                .with_context(|| format!("{} needs a value", flag))
        };
        match flag.as_str() {
            "--to" => to = value()?.split(',').map(|s| s.trim().to_string()).collect(),
            "--message" => message = value()?.clone(),
            "--template" => {
                let id = value()?;
                // Template replaces the compose buffer wholesale.
                message = template::apply(id)
                    .with_context(|| format!("unknown template id: {}", id))?
                    .to_string();
            }
            "--image" => images.push(PathBuf::from(value()?)),
            "--at" => {
                at = Some(
                    DateTime::parse_from_rfc3339(value()?)
                        .context("--at expects an RFC 3339 timestamp")?
                        .with_timezone(&Utc),
                )
            }
            other => bail!("unknown flag: {}", other),
        }
    }
    if to.is_empty() {
        bail!("--to is required");
    }
    Ok(SendArgs { to, message, images, at })
}

async fn send(app: &App, args: &[String]) -> Result<()> {
    let args = parse_send_args(args)?;

    let roster = app.contacts().list().await?;
    let recipients = resolve(&args.to, &roster);
    if recipients.len() < args.to.len() {
        warn!("{} selected id(s) not found in the roster", args.to.len() - recipients.len());
    }

    // Schedule path: park the message, send nothing.
    if let Some(when) = args.at {
        let msg = bulkline_send::orchestrator::build_scheduled(&recipients, &args.message, when)?;
        ScheduledService::new(app.store.clone()).add(&msg)?;
        println!("scheduled for {} ({} recipients)", when, msg.contacts.len());
        return Ok(());
    }

    let (Some(api), Some(blob)) = (app.api.clone(), app.blob.clone()) else {
        bail!("sending requires BULKLINE_API_BASE and BULKLINE_API_KEY");
    };

    let mut attachments = AttachmentSet::new();
    let staged = attachments.add_files(&args.images);
    if staged < args.images.len() {
        warn!("{} file(s) skipped (not images or unreadable)", args.images.len() - staged);
    }

    let history = HistoryService::new(app.store.clone());
    let sender = BulkSender::new(api, blob);
    let outcome = sender.send(&recipients, &args.message, &mut attachments, &history).await?;

    let snap = sender.progress().snapshot();
    println!(
        "dispatched to {} recipient(s) — {}/{} done ({:.0}%)",
        outcome.dispatched,
        snap.sent + snap.failed,
        snap.total,
        snap.percent_complete()
    );
    if let Some(url) = outcome.image_url {
        println!("image: {}", url);
    }
    Ok(())
}

fn history(app: &App) -> Result<()> {
    let entries = HistoryService::new(app.store.clone()).list()?;
    if entries.is_empty() {
        println!("no messages sent yet");
        return Ok(());
    }
    for e in &entries {
        println!(
            "{}  {:<20} {:<15} {:<9} {}",
            e.sent_at.format("%Y-%m-%d %H:%M"),
            e.contact_name,
            e.contact_phone,
            e.status.as_str(),
            e.message
        );
    }
    Ok(())
}

fn scheduled(app: &App, args: &[String]) -> Result<()> {
    let svc = ScheduledService::new(app.store.clone());
    let msgs = if args.first().map(String::as_str) == Some("--due") {
        svc.due(Utc::now())?
    } else {
        svc.list()?
    };
    if msgs.is_empty() {
        println!("nothing scheduled");
        return Ok(());
    }
    for m in &msgs {
        println!("{}  {} recipient(s)  {}", m.scheduled_for, m.contacts.len(), m.message);
    }
    Ok(())
}

fn orders(app: &App) -> Result<()> {
    let orders = OrdersService::new(app.store.clone()).list()?;
    if orders.is_empty() {
        println!("no orders");
        return Ok(());
    }
    for o in &orders {
        println!(
            "{}  {:<20} {:<10} {:>8.2}  {} item(s)",
            o.order_date.format("%Y-%m-%d"),
            o.customer_name,
            o.status.as_str(),
            o.total,
            o.items.len()
        );
    }
    Ok(())
}

async fn images(app: &App) -> Result<()> {
    let Some(blob) = &app.blob else {
        bail!("listing images requires BULKLINE_API_BASE and BULKLINE_API_KEY");
    };
    let items = blob.list(MESSAGES_PREFIX).await?;
    if items.is_empty() {
        println!("no uploaded images");
        return Ok(());
    }
    for i in &items {
        println!("{}  {}", i.name, i.url);
    }
    Ok(())
}
