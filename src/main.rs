use std::fmt::{Debug, Display};

use tokio::task::JoinError;
use university_portal::core::{get_subscriber, init_subscriber, AppConfig};
use university_portal::university_web_server::UniversityWebServer;

use colored::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::new()?;

    let file_appender = tracing_appender::rolling::daily(&config.log.directory, "app");
    let subscriber = get_subscriber(
        "university_portal".into(),
        config.log.level.clone(),
        file_appender,
    );
    init_subscriber(subscriber)?;

    let web_server = UniversityWebServer::build(config.clone()).await?;
    let port = web_server.port();

    let server_task = tokio::spawn(web_server.run_until_stopped());

    println!("{}", "-----------------------------------------".green());
    println!("🚀 Server started on Addr: {}:{}", config.server.host, port);
    println!("{}", "-----------------------------------------".green());

    tokio::select! {
        outcome = server_task => { report_exit("web server", outcome); }
    }
    Ok(())
}

fn report_exit(task_name: &str, outcome: Result<Result<(), impl Debug + Display>, JoinError>) {
    match outcome {
        Ok(Ok(())) => {
            tracing::info!("{} has exited", task_name)
        }
        Ok(Err(e)) => {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "{} failed",
                task_name
            )
        }
        Err(e) => {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "{} task failed to complete",
                task_name
            )
        }
    }
}
