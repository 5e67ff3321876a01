use redis_task_queue::{BasicQueue, ConfigBuilder};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ConfigBuilder::new()
        .host("localhost:6379")
        .timeout(Duration::from_secs(3))
        .build();
    let queue = BasicQueue::connect("demo:basic", config).await?;
    queue.clear().await?;

    println!("Adding tasks to {}...", queue.name());
    queue.add(["resize", "thumbnail", "resize", "upload"]).await?;
    println!("Queue size: {}", queue.size().await);

    println!("\nItem at index 1: {}", queue.get(1).await?);
    queue.remove_index(1).await?;
    println!("Removed index 1, size is now {}", queue.size().await);

    queue.remove("resize").await?;
    println!("Removed every 'resize', size is now {}", queue.size().await);

    println!("\nDraining...");
    while let Some(task) = queue.pop().await {
        println!("  - {}", task);
    }

    Ok(())
}
