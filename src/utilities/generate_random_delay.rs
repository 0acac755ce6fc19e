use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{sleep, Duration};

/// Milliseconds in `[min_delay, max_delay]`; collapses to `min_delay` when the bounds are inverted.
pub fn random_delay_ms(min_delay: u64, max_delay: u64) -> u64 {
    if max_delay <= min_delay {
        return min_delay;
    }
    let mut rng = StdRng::from_entropy();
    rng.gen_range(min_delay..=max_delay)
}

pub async fn generate_random_delay(min_delay: u64, max_delay: u64) {
    let delay = random_delay_ms(min_delay, max_delay);

    println!("Delay: {} milliseconds", delay);
    sleep(Duration::from_millis(delay)).await;
}
