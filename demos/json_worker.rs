use redis_task_queue::{Config, JsonQueue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Email {
    to: String,
    subject: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let queue = JsonQueue::connect("demo:emails", Config::default()).await?;

    let producer = queue.clone();
    tokio::spawn(async move {
        for i in 1..=5 {
            let email = Email {
                to: format!("user{}@example.com", i),
                subject: format!("Welcome #{}", i),
            };
            if let Err(e) = producer.add([email]).await {
                println!("Failed to enqueue: {}", e);
            }
            sleep(Duration::from_millis(200)).await;
        }
    });

    println!("Starting worker, polling for emails...");
    let mut idle = 0;
    while idle < 10 {
        if queue.size().await == 0 {
            idle += 1;
            sleep(Duration::from_millis(250)).await;
            continue;
        }
        idle = 0;

        let mut email = Email::default();
        match queue.pop(&mut email).await {
            Ok(()) if !email.to.is_empty() => {
                println!("Sending '{}' to {}", email.subject, email.to);
            }
            Ok(()) => {}
            Err(e) => {
                println!("Error fetching email: {}", e);
                sleep(Duration::from_secs(1)).await;
            }
        }
    }

    println!("Queue idle, shutting down");
    Ok(())
}
