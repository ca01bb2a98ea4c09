// src/io/sales.rs

use crate::model::observation::Observation;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Units and distinct orders per sales channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSummary {
    pub order_channel: String,
    pub total_orders: usize,
    pub total_qty: f64,
}

/// Groups order lines by channel, busiest channel first.
///
/// Lines without a channel are left out. Orders are counted by distinct
/// order id, so a multi-line order counts once and lines without an id add
/// units but no orders.
pub fn channel_summary(history: &[Observation]) -> Vec<ChannelSummary> {
    let mut grouped: HashMap<&str, (HashSet<&str>, f64)> = HashMap::new();
    for obs in history {
        let Some(channel) = obs.order_channel.as_deref() else {
            continue;
        };
        let (orders, qty) = grouped.entry(channel).or_default();
        if let Some(id) = obs.order_id.as_deref() {
            orders.insert(id);
        }
        *qty += obs.quantity;
    }

    let mut out: Vec<ChannelSummary> = grouped
        .into_iter()
        .map(|(channel, (orders, qty))| ChannelSummary {
            order_channel: channel.to_string(),
            total_orders: orders.len(),
            total_qty: qty,
        })
        .collect();
    out.sort_by(|a, b| {
        b.total_qty
            .total_cmp(&a.total_qty)
            .then_with(|| a.order_channel.cmp(&b.order_channel))
    });
    out
}
