use anyhow::Context;
use clap::{Args, Subcommand};
use owo_colors::OwoColorize;

use crate::auth::login_service::provision_user;
use crate::auth::role::Role;
use crate::config::DatabaseConfig;
use crate::storage::{create_pool, SqlxUserRepository};

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create an identity directly in the store (any role, including admin)
    Create(CreateUserArgs),
}

#[derive(Args, Debug)]
pub struct CreateUserArgs {
    #[arg(long)]
    pub email: String,

    /// Display name
    #[arg(long)]
    pub name: String,

    /// One of admin, host, teacher, student
    #[arg(long, default_value = "admin")]
    pub role: Role,

    /// Initial password (at least 8 characters)
    #[arg(long)]
    pub password: String,
}

pub async fn handle_user_command(
    command: UserCommands,
    database: &DatabaseConfig,
) -> anyhow::Result<()> {
    let pool = create_pool(database).await.context("Failed to open the credential store")?;
    let repository = SqlxUserRepository::new(pool);

    match command {
        UserCommands::Create(args) => {
            let user =
                provision_user(&repository, &args.name, &args.email, &args.password, args.role)
                    .await?;

            println!("{}", "Identity created".green().bold());
            println!("  id:    {}", user.id);
            println!("  email: {}", user.email);
            println!("  role:  {}", user.role.to_string().cyan());
        }
    }

    Ok(())
}
