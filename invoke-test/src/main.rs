use aws_config::BehaviorVersion;
use aws_sdk_lambda::Client;
use clap::Parser;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

const NAMES: &[&str] = &[
    "Alice", "Bob", "Carol", "Dave", "Erin", "Frank", "Grace", "Heidi",
];

#[derive(Default)]
struct Stats {
    success_count: usize,
    mismatch_count: usize,
    error_count: usize,
}

// The shape API Gateway expects back from the function.
#[derive(Deserialize)]
struct ProxyResponse {
    #[serde(rename = "statusCode")]
    status_code: i64,
    body: Option<String>,
}

#[derive(Parser, Debug)]
#[command(name = "invoke-test")]
#[command(about = "Invoke the form handler with random Id/Name bodies and check the echo contract")]
struct Args {
    /// Lambda function name
    function: String,

    /// Number of iterations to run
    #[arg(long, default_value = "1000")]
    iters: usize,

    /// Number of parallel threads
    #[arg(long, default_value = "1")]
    threads: usize,

    /// Upper bound for the random numeric Id (1 to N)
    #[arg(long, default_value = "1000")]
    ids: u32,
}

async fn run_invocations(
    client: Arc<Client>,
    function_name: String,
    thread_id: usize,
    start: usize,
    end: usize,
    total: usize,
    max_id: u32,
    stats: Arc<Mutex<Stats>>,
) {
    let mut rng = StdRng::from_entropy();

    for i in start..=end {
        let id = rng.gen_range(1..=max_id);
        let name = NAMES[rng.gen_range(0..NAMES.len())];
        let expected = format!("Id: {id}, Name: {name}");

        // An API Gateway proxy event carrying the form body.
        let payload = serde_json::json!({
            "httpMethod": "POST",
            "body": format!("Id={id}&Name={name}"),
        });

        let result = client
            .invoke()
            .function_name(&function_name)
            .payload(aws_sdk_lambda::primitives::Blob::new(
                serde_json::to_vec(&payload).unwrap(),
            ))
            .send()
            .await;

        match result {
            Ok(response) => {
                let response_payload = response
                    .payload()
                    .map(|b| String::from_utf8_lossy(b.as_ref()).to_string())
                    .unwrap_or_else(|| "No response".to_string());

                let ok = serde_json::from_str::<ProxyResponse>(&response_payload)
                    .map(|resp| {
                        resp.status_code == 200 && resp.body.as_deref() == Some(expected.as_str())
                    })
                    .unwrap_or(false);

                {
                    let mut stats = stats.lock().await;
                    if ok {
                        stats.success_count += 1;
                    } else {
                        stats.mismatch_count += 1;
                    }
                }

                println!(
                    "[Thread {}: {}/{}] Id={} Name={} => {}",
                    thread_id, i, total, id, name, response_payload
                );
            }
            Err(e) => {
                {
                    let mut stats = stats.lock().await;
                    stats.error_count += 1;
                }

                eprintln!(
                    "[Thread {}: {}/{}] Error invoking with Id={} Name={}: {}",
                    thread_id, i, total, id, name, e
                );
            }
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    println!(
        "Running {} invocations across {} thread(s)",
        args.iters, args.threads
    );

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let client = Arc::new(Client::new(&config));

    let stats = Arc::new(Mutex::new(Stats::default()));

    let iters_per_thread = args.iters / args.threads;
    let remainder = args.iters % args.threads;

    let mut tasks = JoinSet::new();

    let total_iters = args.iters;
    let max_id = args.ids;

    let mut start = 1;
    for t in 1..=args.threads {
        let end = if t == args.threads {
            start + iters_per_thread - 1 + remainder
        } else {
            start + iters_per_thread - 1
        };

        let client = Arc::clone(&client);
        let function_name = args.function.clone();
        let stats = Arc::clone(&stats);

        tasks.spawn(async move {
            run_invocations(
                client,
                function_name,
                t,
                start,
                end,
                total_iters,
                max_id,
                stats,
            )
            .await;
        });

        start = end + 1;
    }

    while let Some(result) = tasks.join_next().await {
        if let Err(e) = result {
            eprintln!("Task failed: {}", e);
        }
    }

    let stats = stats.lock().await;
    println!("Completed {} invocations", args.iters);
    println!();
    println!("Results:");
    println!("  Matched:    {}", stats.success_count);
    println!("  Mismatched: {}", stats.mismatch_count);
    println!("  Errors:     {}", stats.error_count);
}
