use anyhow::{bail, Result};
use catalog_api::{
    create_product_action, delete_product_action, get_product, list_products,
    update_product_action, ApiContext,
};
use clap::{Args, Parser, Subcommand};
use shared::{
    domain::{Product, ProductId},
    protocol::{ActionOutcome, ProductForm},
};
use storage::Storage;

mod users;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/catalog.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Seed,
    List,
    Show {
        id: i64,
    },
    Create(ProductArgs),
    Update {
        id: i64,
        #[command(flatten)]
        product: ProductArgs,
    },
    Delete {
        id: i64,
    },
    Users {
        #[arg(long, default_value = users::DEFAULT_USERS_URL)]
        url: String,
    },
}

/// Passed through as raw text so the catalog validation applies.
#[derive(Args, Debug)]
struct ProductArgs {
    #[arg(long, default_value = "")]
    title: String,
    #[arg(long, default_value = "")]
    price: String,
    #[arg(long, default_value = "")]
    description: String,
}

impl From<ProductArgs> for ProductForm {
    fn from(args: ProductArgs) -> Self {
        ProductForm::new(args.title, args.price, args.description)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Users { url } => {
            for user in users::fetch_users(&reqwest::Client::new(), &url).await? {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    user.id, user.name, user.username, user.email, user.phone
                );
            }
        }
        Command::Seed => {
            let storage = Storage::new(&cli.database_url).await?;
            let inserted = storage.seed_if_empty().await?;
            println!("seeded {inserted} products");
        }
        Command::List => {
            let ctx = open_catalog(&cli.database_url).await?;
            for product in list_products(&ctx).await? {
                print_product(&product);
            }
        }
        Command::Show { id } => {
            let ctx = open_catalog(&cli.database_url).await?;
            print_product(&get_product(&ctx, ProductId(id)).await?);
        }
        Command::Create(product) => {
            let ctx = open_catalog(&cli.database_url).await?;
            let outcome = create_product_action(&ctx, &product.into()).await?;
            report(outcome)?;
        }
        Command::Update { id, product } => {
            let ctx = open_catalog(&cli.database_url).await?;
            let outcome = update_product_action(&ctx, ProductId(id), &product.into()).await?;
            report(outcome)?;
        }
        Command::Delete { id } => {
            let ctx = open_catalog(&cli.database_url).await?;
            delete_product_action(&ctx, ProductId(id)).await?;
            println!("deleted product_id={id}");
        }
    }

    Ok(())
}

async fn open_catalog(database_url: &str) -> Result<ApiContext> {
    Ok(ApiContext::new(Storage::new(database_url).await?))
}

fn print_product(product: &Product) {
    println!(
        "{}\t{}\t{}\t{}",
        product.id, product.title, product.price, product.description
    );
}

fn report(outcome: ActionOutcome) -> Result<()> {
    match outcome {
        ActionOutcome::Redirect(_) => {
            println!("ok");
            Ok(())
        }
        ActionOutcome::Invalid(state) => {
            for (field, message) in state.errors.iter() {
                eprintln!("{field}: {message}");
            }
            bail!("product form rejected")
        }
    }
}
