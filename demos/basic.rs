use std::sync::atomic::{AtomicU32, Ordering};

use attempt_retry::{retry, RetryOptions};

static CALLS: AtomicU32 = AtomicU32::new(0);

async fn flaky_fetch(attempt_num: u64) -> Result<String, std::io::Error> {
    if CALLS.fetch_add(1, Ordering::SeqCst) < 2 {
        return Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            format!("connection reset on attempt {attempt_num}"),
        ));
    }
    Ok(format!("payload from attempt {attempt_num}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let options = RetryOptions::<String, std::io::Error>::from_env("ATTEMPT_RETRY_")?
        .delay(100)
        .factor(2.0)
        .max_delay(1_000)
        .max_attempts(5)
        .timeout(2_000)
        .total_timeout(10_000)
        .jitter(true)
        .handle_error(|err, context| {
            eprintln!("attempt {} failed: {err}", context.attempt_num());
            Box::pin(async { Ok(()) })
        });

    let payload = retry(
        |context, _config| flaky_fetch(context.attempt_num()),
        options,
    )
    .await?;

    println!("{payload}");
    Ok(())
}
