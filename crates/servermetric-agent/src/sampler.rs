//! 시스템 리소스 샘플러.
//!
//! sysinfo 기반 CPU/메모리/디스크 수집. 한 번의 샘플은 `system` 메트릭의 한 행이 된다.

use serde_json::json;
use servermetric_core::models::metric::Sample;
use sysinfo::{Disks, System};
use tracing::debug;

/// 메트릭 이름
pub const SYSTEM_METRIC: &str = "system";
/// 필드 이름 (쉼표 구분)
pub const SYSTEM_FIELDS: &str = "timestamp,cpu_usage,memory_used,memory_total,disk_used,disk_total";
/// 컬럼 타입
pub const SYSTEM_TYPES: &str = "int64, float64, uint64, uint64, uint64, uint64";

/// sysinfo 기반 시스템 샘플러
pub struct SystemSampler {
    sys: System,
}

impl SystemSampler {
    /// 새 샘플러 생성
    pub fn new() -> Self {
        Self {
            sys: System::new_all(),
        }
    }

    /// 현재 시스템 상태 샘플
    pub fn sample(&mut self) -> Sample {
        self.sys.refresh_cpu_usage();
        self.sys.refresh_memory();

        let cpu_usage = self.sys.global_cpu_usage();
        let memory_used = self.sys.used_memory();
        let memory_total = self.sys.total_memory();

        // 디스크 합계 (마운트 변화 반영을 위해 매번 새로 조회)
        let disks = Disks::new_with_refreshed_list();
        let (disk_used, disk_total) = disks.list().iter().fold((0u64, 0u64), |(used, total), d| {
            (
                used + d.total_space().saturating_sub(d.available_space()),
                total + d.total_space(),
            )
        });

        debug!(
            "시스템 샘플: CPU {:.1}%, 메모리 {}/{}MB",
            cpu_usage,
            memory_used / 1024 / 1024,
            memory_total / 1024 / 1024
        );

        vec![
            json!(chrono::Utc::now().timestamp_millis()),
            json!(cpu_usage),
            json!(memory_used),
            json!(memory_total),
            json!(disk_used),
            json!(disk_total),
        ]
    }
}

impl Default for SystemSampler {
    fn default() -> Self {
        Self::new()
    }
}
