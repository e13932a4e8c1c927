mod config;
mod render;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use platform_api::{RestClient, Synced};
use platform_obs::{ObsConfig, init_tracing};
use products_hr::{
    EmployeeDirectory, EmployeeForm, EmployeeQuery, RestEmployeeApi, Sort, SortDirection,
    SortField, job_titles,
};
use tracing::info;

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "hr-directory", version, about = "List and add employees")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the employee table.
    List(ListCommand),
    /// Add a new employee.
    Add(AddCommand),
    /// Print the distinct job titles.
    Titles,
}

#[derive(Args, Debug)]
struct ListCommand {
    #[arg(long, help = "Match against first name, last name or full name")]
    search: Option<String>,
    #[arg(long, help = "Exact job title, case-insensitive")]
    job_title: Option<String>,
    #[arg(long, value_name = "FIELD")]
    sort: Option<SortField>,
    #[arg(long, requires = "sort")]
    desc: bool,
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,
    #[arg(long, help = "Rows per page (defaults to HR_PAGE_SIZE)")]
    page_size: Option<usize>,
    #[arg(long, help = "Emit the page as JSON")]
    json: bool,
}

#[derive(Args, Debug)]
struct AddCommand {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long, value_name = "YYYY-MM-DD")]
    date_of_birth: String,
    #[arg(long)]
    job_title: String,
}

impl From<AddCommand> for EmployeeForm {
    fn from(value: AddCommand) -> Self {
        EmployeeForm {
            first_name: value.first_name,
            last_name: value.last_name,
            date_of_birth: value.date_of_birth,
            job_title: value.job_title,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _obs = init_tracing(ObsConfig::new("hr-directory"))?;
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    let directory = build_directory(&config)?;

    match cli.command {
        Command::List(cmd) => list(&directory, &config, cmd).await,
        Command::Add(cmd) => add(&directory, cmd).await,
        Command::Titles => titles(&directory).await,
    }
}

fn build_directory(config: &AppConfig) -> Result<EmployeeDirectory<RestEmployeeApi>> {
    let client =
        RestClient::new(&config.client_settings()).context("failed to build HTTP client")?;
    let api = RestEmployeeApi::new(client, config.endpoint.clone());
    info!(endpoint = %api.endpoint(), timeout = ?config.request_timeout, "employee directory configured");
    Ok(EmployeeDirectory::new(api))
}

async fn list(
    directory: &EmployeeDirectory<RestEmployeeApi>,
    config: &AppConfig,
    cmd: ListCommand,
) -> Result<()> {
    let refreshed = directory.refresh().await;
    report_degraded(&refreshed, "showing fallback data");

    let query = EmployeeQuery {
        search: cmd.search,
        job_title: cmd.job_title,
        sort: cmd.sort.map(|field| Sort {
            field,
            direction: if cmd.desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            },
        }),
        page: (cmd.page - 1) as usize,
        page_size: cmd.page_size.unwrap_or(config.page_size),
    };
    let page = query.apply(refreshed.value());

    if cmd.json {
        let body = serde_json::to_string_pretty(&page.items).context("failed to encode page")?;
        println!("{body}");
    } else {
        print!("{}", render::table(&page));
    }
    Ok(())
}

async fn add(directory: &EmployeeDirectory<RestEmployeeApi>, cmd: AddCommand) -> Result<()> {
    let draft = EmployeeForm::from(cmd).validate()?;
    let created = directory.create(draft).await;
    report_degraded(&created, "employee kept locally");

    let employee = created.value();
    if employee.is_assigned() {
        println!("added #{} {}", employee.id, employee.full_name());
    } else {
        println!("added {}", employee.full_name());
    }
    Ok(())
}

async fn titles(directory: &EmployeeDirectory<RestEmployeeApi>) -> Result<()> {
    let refreshed = directory.refresh().await;
    report_degraded(&refreshed, "showing fallback data");
    for title in job_titles(refreshed.value()) {
        println!("{title}");
    }
    Ok(())
}

fn report_degraded<T>(result: &Synced<T>, consequence: &str) {
    if let Some(cause) = result.cause() {
        eprintln!("warning: employee service unavailable ({cause}); {consequence}");
    }
}
