//! Fan-out rounds: one producer distributes a random value to every rendezvous
//! channel while a single consumer drains them with `recv_one`.

use crate::config::FanoutConfig;
use crate::io::base::rendezvous;
use crate::io::oneof::{Delivery, recv_one, send_each};
use crate::io::select::Outcome;
use crate::utils::CancelToken;
use anyhow::{Context, anyhow};
use rand::Rng;
use std::thread;

/// What one round observed on both sides.
#[derive(Debug, Clone)]
pub struct RoundReport {
    pub size: usize,
    pub delivery: Delivery,
    /// `(index, value)` pairs in the order the consumer got them.
    pub received: Vec<(usize, u32)>,
}

impl RoundReport {
    /// Index of the first endpoint the consumer never heard from, if any.
    pub fn first_missing(&self) -> Option<usize> {
        let mut seen = vec![false; self.size];
        for &(index, _) in &self.received {
            if let Some(s) = seen.get_mut(index) {
                *s = true;
            }
        }
        seen.iter().position(|s| !s)
    }
}

/// Run one round over `size` fresh channels.
///
/// The consumer loops until the round's token is cancelled, which happens only
/// after `send_each` returned, so every delivered value has been received by then.
pub fn run_round(size: usize, value_bound: u32, parent: &CancelToken) -> anyhow::Result<RoundReport> {
    let (tx, rx) = rendezvous::<u32>(size);
    let cancel = parent.new_child();

    let consumer = {
        let cancel = cancel.clone();
        thread::Builder::new()
            .name(format!("fanout-consumer-{size}"))
            .spawn(move || -> anyhow::Result<Vec<(usize, u32)>> {
                let mut received = Vec::with_capacity(rx.len());
                loop {
                    match recv_one(&rx, &cancel)? {
                        Outcome::Ready((index, value)) => {
                            tracing::debug!(index, value, "consumer received");
                            received.push((index, value));
                        }
                        Outcome::Cancelled => return Ok(received),
                    }
                }
            })
            .context("failed to spawn consumer thread")?
    };

    let mut rng = rand::thread_rng();
    let sent = send_each(&tx, || rng.gen_range(0..value_bound), &cancel);
    cancel.cancel();

    let received = consumer
        .join()
        .map_err(|_| anyhow!("consumer thread panicked"))??;
    let delivery = sent?;

    let report = RoundReport {
        size,
        delivery,
        received,
    };
    tracing::info!(
        size,
        completed = report.delivery.completed,
        order = ?report.delivery.order,
        "round finished"
    );

    if report.delivery.completed {
        if let Some(index) = report.first_missing() {
            return Err(anyhow!(
                "implementation error: endpoint {index} of {size} was never received"
            ));
        }
    }
    Ok(report)
}

/// Run every configured round in order, stopping at the first failure or when
/// `cancel` fires.
pub fn run(cfg: &FanoutConfig, cancel: &CancelToken) -> anyhow::Result<Vec<RoundReport>> {
    cfg.validate()?;
    let mut reports = Vec::with_capacity(cfg.sizes.len());
    for &size in &cfg.sizes {
        if cancel.is_cancelled() {
            tracing::warn!("fanout cancelled before round of size {size}");
            break;
        }
        let report =
            run_round(size, cfg.value_bound, cancel).with_context(|| format!("round of size {size}"))?;
        reports.push(report);
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_round_covers_all_endpoints() {
        let cfg = FanoutConfig {
            sizes: vec![1, 4, 9, 19],
            ..FanoutConfig::default()
        };
        let cancel = CancelToken::new_root();
        let reports = run(&cfg, &cancel).unwrap();

        assert_eq!(reports.len(), 4);
        for r in &reports {
            assert!(r.delivery.completed);
            assert!(r.delivery.is_permutation_of(r.size));
            assert_eq!(r.first_missing(), None);
            assert!(r.received.iter().all(|&(_, v)| v < cfg.value_bound));
            let got: Vec<usize> = r.received.iter().map(|&(i, _)| i).collect();
            assert_eq!(got, r.delivery.order);
        }
    }

    #[test]
    fn cancelled_parent_stops_before_the_first_round() {
        let cancel = CancelToken::new_root();
        cancel.cancel();
        let reports = run(&FanoutConfig::default(), &cancel).unwrap();
        assert!(reports.is_empty());
    }

    #[test]
    fn missing_index_is_reported() {
        let report = RoundReport {
            size: 3,
            delivery: Delivery::default(),
            received: vec![(0, 1), (2, 5)],
        };
        assert_eq!(report.first_missing(), Some(1));
    }
}
