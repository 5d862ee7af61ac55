//! 메트릭 버퍼 모델.
//!
//! 메트릭 이름별로 샘플을 순서대로 쌓는다. 필드/타입 메타데이터는 선택적이며
//! 해당 이름이 버퍼에 처음 생성될 때 한 번만 기록된다.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 단일 샘플 — 느슨한 타입의 값 목록
pub type Sample = Vec<serde_json::Value>;

/// 이름 하나에 속한 샘플 시퀀스
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    /// 필드 이름 (쉼표 구분, 호출자가 넘긴 그대로)
    #[serde(default)]
    pub fields: String,
    /// 컬럼별 타입 목록
    #[serde(default)]
    pub types: Vec<String>,
    /// 추가 순서대로 저장된 샘플
    pub data: Vec<Sample>,
}

impl MetricSeries {
    fn typed(fields: &str, types: &str) -> Self {
        Self {
            fields: fields.to_string(),
            types: parse_types(types),
            data: Vec::new(),
        }
    }
}

/// 쉼표 구분 타입 문자열 파싱 (공백 제거)
///
/// `"int64, float64"` → `["int64", "float64"]`, 빈 문자열 → `[]`
pub fn parse_types(types: &str) -> Vec<String> {
    let compact: String = types.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Vec::new();
    }
    compact.split(',').map(str::to_string).collect()
}

/// 메트릭 버퍼 — 이름 → 샘플 시퀀스
///
/// 푸시 성공 시 통째로 빈 버퍼와 교체된다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricBuffer {
    series: BTreeMap<String, MetricSeries>,
}

impl MetricBuffer {
    /// 메타데이터 없는 샘플 추가
    pub fn append(&mut self, name: &str, sample: Sample) {
        self.series
            .entry(name.to_string())
            .or_default()
            .data
            .push(sample);
    }

    /// 필드/타입 메타데이터와 함께 샘플 추가
    ///
    /// 메타데이터는 이름이 처음 생성될 때만 기록되며 이후 호출의 값은 무시된다.
    pub fn append_typed(&mut self, name: &str, fields: &str, types: &str, sample: Sample) {
        self.series
            .entry(name.to_string())
            .or_insert_with(|| MetricSeries::typed(fields, types))
            .data
            .push(sample);
    }

    /// 버퍼를 비우고 기존 내용 반환
    pub fn take(&mut self) -> MetricBuffer {
        std::mem::take(self)
    }

    /// 버퍼 비우기
    pub fn clear(&mut self) {
        self.series = BTreeMap::new();
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// 메트릭 이름 수
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// 전체 샘플 수
    pub fn sample_count(&self) -> usize {
        self.series.values().map(|s| s.data.len()).sum()
    }

    /// 이름으로 시퀀스 조회
    pub fn series(&self, name: &str) -> Option<&MetricSeries> {
        self.series.get(name)
    }
}
