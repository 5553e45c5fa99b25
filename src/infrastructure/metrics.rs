// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::MetricsSettings;
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 初始化指标系统
///
/// 安装Prometheus导出器并注册排名采集相关的指标。
/// 导出器安装失败只记录警告，不影响服务运行。
pub fn init_metrics(settings: &MetricsSettings) {
    if !settings.enabled {
        info!("Metrics exporter disabled");
        return;
    }

    let addr: SocketAddr = match settings.listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!(
                "Invalid metrics address {}: {}. Metrics exporter not started.",
                settings.listen_addr, e
            );
            return;
        }
    };

    // 端口被占用时（例如开发环境）忽略错误
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}. This might happen if the port is already in use.", e);
        return;
    }

    describe_metrics();
    info!("Metrics exporter listening on {}", addr);
}

fn describe_metrics() {
    describe_counter!(
        "rankrs_resolutions_total",
        "Total number of ranking resolutions by outcome"
    );
    describe_counter!(
        "rankrs_location_attempts_total",
        "Total number of attempts to read a restaurant address"
    );
    describe_histogram!(
        "rankrs_scan_entries",
        "Number of listing entries classified before a scan ended without a match"
    );
    describe_gauge!(
        "rankrs_scheduler_cycle_seconds",
        "Duration of the most recent scheduler cycle in seconds"
    );
}
