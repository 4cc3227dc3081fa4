//! top-K 视图筛选.
//!
//! 消费 [`crate::visibility`] 产出的记录流, 为每个 (label, instance)
//! 组挑选可见像素最多的 K 张视图. 纯函数, 不做任何 I/O.

use std::collections::BTreeMap;

use binary_heap_plus::BinaryHeap;
use itertools::Itertools;

use crate::visibility::VisibilityRecord;
use crate::InstanceId;

/// (label, instance id) 到其入选视图记录 (按优先级降序) 的有序映射.
pub type RankedViews = BTreeMap<(String, InstanceId), Vec<VisibilityRecord>>;

/// 为每个 (label, instance) 组选出可见像素最多的 `k` 条记录.
///
/// 组内顺序: `pixel_count` 降序, 同数时按图像名升序, 与记录的到达顺序无关.
///
/// # 注意
///
/// 记录不足 `k` 条的组会被 **整组剔除**, 而不是降级为 "有多少取多少".
/// 只有至少在 `k` 张视图中可见的实例才被认为足够可靠.
pub fn select_top_k(records: Vec<VisibilityRecord>, k: usize) -> RankedViews {
    let groups = records
        .into_iter()
        .map(|r| ((r.label.clone(), r.instance_id), r))
        .into_group_map();

    let mut ranked = RankedViews::new();
    for (key, group) in groups {
        if group.len() < k {
            continue;
        }

        // 堆顶是像素数最大的记录; 同数时图像名较小者优先.
        let mut heap = BinaryHeap::new_by(|a: &VisibilityRecord, b: &VisibilityRecord| {
            a.pixel_count
                .cmp(&b.pixel_count)
                .then_with(|| b.image.cmp(&a.image))
        });
        for r in group {
            heap.push(r);
        }

        let mut picked = Vec::with_capacity(k);
        while picked.len() < k {
            match heap.pop() {
                Some(r) => picked.push(r),
                None => break,
            }
        }
        ranked.insert(key, picked);
    }
    ranked
}
