// src/cli.rs

use clap::Parser;
use std::path::PathBuf;
use tracing::warn;

use crate::config::{AppConfig, BoxError};
use crate::models::RecordId;
use crate::services::{OrganizationService, QueryParams, UserService};
use crate::store::{MasterKey, RadDB, Store};

// === CLI ===

#[derive(Parser)]
#[command(name = "kbm", author, version)]
#[command(about = "Управление организациями и пользователями KBM", long_about = None)]
pub struct Cli {
    /// Путь к config.yaml
    #[arg(short, long, env = "KBM_CONFIG", default_value = "config.yaml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand)]
pub enum Command {
    /// Запустить gRPC-сервер
    #[cfg(feature = "grpc")]
    Serve {
        /// Адрес (по умолчанию — из конфига)
        #[arg(long)]
        addr: Option<String>,
    },
    /// Управление организациями
    Org {
        #[command(subcommand)]
        cmd: OrgCommand,
    },
    /// Управление пользователями
    User {
        #[command(subcommand)]
        cmd: UserCommand,
    },
    /// Сгенерировать мастер-ключ RadDB
    Keygen,
}

// === Подкоманды ===

#[derive(clap::Args)]
pub struct ListArgs {
    /// Подстрока для поиска
    #[arg(short, long, default_value = "")]
    query: String,
    /// "Name" или поле времени создания
    #[arg(long, default_value = "CreatedAt")]
    order_by: String,
    #[arg(long, default_value_t = 1)]
    page: i32,
    #[arg(long, default_value_t = 20)]
    page_size: i32,
    #[arg(short, long)]
    json: bool,
}

impl ListArgs {
    fn params(&self) -> QueryParams {
        QueryParams::new(self.query.clone(), self.order_by.clone(), self.page, self.page_size)
    }
}

#[derive(clap::Subcommand)]
pub enum OrgCommand {
    Create {
        name: String,
        #[arg(short, long, default_value = "")]
        address: String,
    },
    Get { id: RecordId },
    List(ListArgs),
    Update {
        id: RecordId,
        name: String,
        #[arg(short, long, default_value = "")]
        address: String,
    },
    Delete { id: RecordId },
}

#[derive(clap::Subcommand)]
pub enum UserCommand {
    Create {
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long, default_value = "")]
        name: String,
    },
    Get { id: RecordId },
    List(ListArgs),
    Update {
        id: RecordId,
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long, default_value = "")]
        name: String,
    },
    Delete { id: RecordId },
    /// Привязать пользователя к организации
    Associate {
        user_id: RecordId,
        organization_id: RecordId,
    },
    /// Отвязать пользователя от организации
    Disassociate { user_id: RecordId },
}

/// Точка входа CLI
pub async fn run(cli: Cli, config: &AppConfig) -> Result<(), BoxError> {
    match cli.command {
        #[cfg(feature = "grpc")]
        Command::Serve { addr } => {
            let store = open_store(config)?;
            let addr = addr.unwrap_or_else(|| config.grpc_server.address.clone());
            println!("🚀 Запуск gRPC на {}", addr);
            crate::grpc::run_grpc_server(store, &addr).await?;
        }
        Command::Org { cmd } => {
            let store = open_one_shot_store(config)?;
            handle_org(cmd, &OrganizationService::new(&store)).await?;
        }
        Command::User { cmd } => {
            let store = open_one_shot_store(config)?;
            handle_user(cmd, &UserService::new(&store)).await?;
        }
        Command::Keygen => {
            println!("{}", hex::encode(RadDB::generate_key()));
        }
    }

    Ok(())
}

/// Открыть хранилище, указанное в конфиге
pub fn open_store(config: &AppConfig) -> Result<Store, BoxError> {
    if config.uses_memory_store() {
        return Ok(Store::in_memory());
    }

    let hex = config
        .master_key_hex
        .as_deref()
        .ok_or("master_key_hex is required for a file store")?;
    let key = decode_key(hex)?;
    Ok(Store::open(&config.db_path, &key)?)
}

/// Предупреждение для разовой команды поверх хранилища в памяти
pub fn ephemeral_store_notice(config: &AppConfig) -> Option<String> {
    config.uses_memory_store().then(|| {
        format!(
            "db_path = \"{}\": данные не сохранятся после завершения команды",
            config.db_path
        )
    })
}

// Разовые команды org/user: хранилище в памяти живёт только до выхода
fn open_one_shot_store(config: &AppConfig) -> Result<Store, BoxError> {
    if let Some(notice) = ephemeral_store_notice(config) {
        warn!(db_path = %config.db_path, "one-shot command on in-memory store");
        eprintln!("⚠️  {}", notice);
    }
    open_store(config)
}

pub fn decode_key(hex: &str) -> Result<MasterKey, hex::FromHexError> {
    let mut key = [0u8; 32];
    hex::decode_to_slice(hex, &mut key)?;
    Ok(key)
}

// === Обработчики ===

async fn handle_org(cmd: OrgCommand, service: &OrganizationService) -> Result<(), BoxError> {
    match cmd {
        OrgCommand::Create { name, address } => {
            let id = service.create(&name, &address).await?;
            println!("✅ Организация создана: id={}", id);
        }
        OrgCommand::Get { id } => {
            let organization = service.get(id).await?;
            println!("{:#?}", organization);
        }
        OrgCommand::List(args) => {
            let result = service.query(&args.params()).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result.items)?);
            } else {
                for o in &result.items {
                    println!("{} | {} | {}", o.id, o.name, o.address_or_empty());
                }
                println!("— страница {} ({} на странице), всего {}", result.page, result.page_size, result.total);
            }
        }
        OrgCommand::Update { id, name, address } => {
            println!("✅ {}", service.update(id, &name, &address).await?);
        }
        OrgCommand::Delete { id } => {
            println!("✅ {}", service.delete(id).await?);
        }
    }
    Ok(())
}

async fn handle_user(cmd: UserCommand, service: &UserService) -> Result<(), BoxError> {
    match cmd {
        UserCommand::Create { username, email, name } => {
            let id = service.create(&name, &username, &email).await?;
            println!("✅ Пользователь создан: id={}", id);
        }
        UserCommand::Get { id } => {
            let user = service.get(id).await?;
            println!("{:#?}", user);
        }
        UserCommand::List(args) => {
            let result = service.query(&args.params()).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result.items)?);
            } else {
                for u in &result.items {
                    println!("{} | {} | {} | {}", u.id, u.username, u.email, u.name);
                }
                println!("— страница {} ({} на странице), всего {}", result.page, result.page_size, result.total);
            }
        }
        UserCommand::Update { id, username, email, name } => {
            println!("✅ {}", service.update(id, &name, &username, &email).await?);
        }
        UserCommand::Delete { id } => {
            println!("✅ {}", service.delete(id).await?);
        }
        // Результат привязки всегда приходит текстом
        UserCommand::Associate { user_id, organization_id } => {
            println!("{}", service.associate_user_to_organization(user_id, organization_id).await);
        }
        UserCommand::Disassociate { user_id } => {
            println!("{}", service.disassociate_user_from_organization(user_id).await);
        }
    }
    Ok(())
}
