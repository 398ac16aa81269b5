use anyhow::Result;
use clap::{arg, Arg, ArgAction, ArgMatches};

use gari::{auth::hash_password, Config, Database, User};

pub fn cmd() -> clap::Command {
    clap::Command::new("user")
        .subcommand_required(true)
        .display_order(10)
        .about("Inspect and manipulate users")
        .subcommand(
            clap::Command::new("add")
                .arg_required_else_help(true)
                .about("Adds new user")
                .arg(arg!(<email> "User email"))
                .arg(arg!(<passwd> "User password"))
                .arg(
                    Arg::new("is_admin")
                        .short('a')
                        .long("admin")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("is_approved")
                        .long("approved")
                        .action(ArgAction::SetTrue),
                )
                .arg(arg!(--first_name [first_name] "User first name"))
                .arg(arg!(--last_name [last_name] "User last name")),
        )
        .subcommand(clap::Command::new("list").about("Lists all users"))
        .subcommand(
            clap::Command::new("approve")
                .arg_required_else_help(true)
                .about("Approves a pending worker")
                .arg(arg!(<email> "User email")),
        )
        .subcommand(
            clap::Command::new("promote")
                .arg_required_else_help(true)
                .about("Promotes an approved worker to admin")
                .arg(arg!(<email> "User email")),
        )
}

pub async fn run(matches: &ArgMatches, config: &Config) -> Result<()> {
    let db = Database::open(&config.db.path)?;

    match matches.subcommand() {
        Some(("add", m)) => add(m, &db)?,
        Some(("list", _)) => list(&db)?,
        Some(("approve", m)) => approve(m, &db)?,
        Some(("promote", m)) => promote(m, &db)?,
        _ => unimplemented!(),
    }

    Ok(())
}

fn add(matches: &ArgMatches, db: &Database) -> Result<()> {
    let email = matches
        .get_one::<String>("email")
        .expect("email is required")
        .clone();
    let password = matches
        .get_one::<String>("passwd")
        .expect("password is required");

    if find_by_email(db, &email)?.is_some() {
        anyhow::bail!("user with email {} already exists", email);
    }

    let user = User {
        email,
        first_name: matches
            .get_one::<String>("first_name")
            .cloned()
            .unwrap_or_default(),
        last_name: matches
            .get_one::<String>("last_name")
            .cloned()
            .unwrap_or_default(),
        password_hash: Some(hash_password(password)?),
        is_admin: matches.get_flag("is_admin"),
        is_approved: matches.get_flag("is_approved") || matches.get_flag("is_admin"),
        ..Default::default()
    };
    db.set(&user)?;

    println!("created user {} ({})", user.email, user.id);
    Ok(())
}

fn list(db: &Database) -> Result<()> {
    let mut users = db.get_collection::<User>()?;
    users.sort_by_key(|u| u.date_joined);

    for user in users {
        let role = if user.is_admin {
            "admin"
        } else if user.is_approved {
            "worker"
        } else {
            "pending"
        };
        println!("{}  {:<10} {}", user.id, role, user.email);
    }
    Ok(())
}

fn approve(matches: &ArgMatches, db: &Database) -> Result<()> {
    let email = matches
        .get_one::<String>("email")
        .expect("email is required");
    let mut user =
        find_by_email(db, email)?.ok_or_else(|| anyhow::anyhow!("user not found: {}", email))?;

    user.is_approved = true;
    db.set(&user)?;

    println!("approved {}", user.email);
    Ok(())
}

fn promote(matches: &ArgMatches, db: &Database) -> Result<()> {
    let email = matches
        .get_one::<String>("email")
        .expect("email is required");
    let mut user =
        find_by_email(db, email)?.ok_or_else(|| anyhow::anyhow!("user not found: {}", email))?;

    if !user.is_approved {
        anyhow::bail!("user must be approved before promotion to admin");
    }
    user.is_admin = true;
    db.set(&user)?;

    println!("promoted {} to admin", user.email);
    Ok(())
}

fn find_by_email(db: &Database, email: &str) -> Result<Option<User>> {
    Ok(db
        .get_collection::<User>()?
        .into_iter()
        .find(|u| u.email == email))
}
