use std::collections::HashSet;
use std::hash::Hash;

/// 单行排序值更新
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderUpdate<K> {
    pub key: K,
    pub display_order: i32,
}

/// 两阶段排序更新计划
///
/// `display_order` 列带唯一约束，直接逐行写入新值会与尚未移动的行冲突。
/// 先执行 `stage` 把所有要移动的行挪到互不相同的负数临时值，再执行
/// `finalize` 写入最终位置。两个阶段应在同一个逻辑单元内提交。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderPlan<K> {
    pub stage: Vec<OrderUpdate<K>>,
    pub finalize: Vec<OrderUpdate<K>>,
}

impl<K> ReorderPlan<K> {
    pub fn is_empty(&self) -> bool {
        self.finalize.is_empty()
    }
}

/// 根据当前排序和期望顺序生成更新计划
///
/// 最终位置从 0 开始连续编号。`desired` 中未知或重复的 key 被忽略，
/// 未出现在 `desired` 中的行按原有顺序排在末尾。位置不变的行不产生更新。
pub fn plan_reorder<K: Clone + Eq + Hash>(current: &[(K, i32)], desired: &[K]) -> ReorderPlan<K> {
    let known: HashSet<&K> = current.iter().map(|(k, _)| k).collect();
    let mut seen: HashSet<&K> = HashSet::new();
    let mut final_order: Vec<&K> = Vec::with_capacity(current.len());

    for key in desired {
        if known.contains(key) && seen.insert(key) {
            final_order.push(key);
        }
    }

    let mut rest: Vec<&(K, i32)> = current.iter().filter(|(k, _)| !seen.contains(k)).collect();
    rest.sort_by_key(|(_, order)| *order);
    final_order.extend(rest.into_iter().map(|(k, _)| k));

    // 临时值必须低于现有的所有值，包括上次中断留下的负数
    let floor = current.iter().map(|(_, o)| *o).min().unwrap_or(0).min(0);

    let mut stage = Vec::new();
    let mut finalize = Vec::new();
    for (position, key) in final_order.into_iter().enumerate() {
        let position = position as i32;
        let current_order = current
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, o)| *o);
        if current_order == Some(position) {
            continue;
        }
        stage.push(OrderUpdate {
            key: key.clone(),
            display_order: floor - 1 - stage.len() as i32,
        });
        finalize.push(OrderUpdate {
            key: key.clone(),
            display_order: position,
        });
    }

    ReorderPlan { stage, finalize }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn apply(state: &mut HashMap<&'static str, i32>, updates: &[OrderUpdate<&'static str>]) {
        for update in updates {
            state.insert(update.key, update.display_order);
            let values: HashSet<i32> = state.values().copied().collect();
            assert_eq!(values.len(), state.len(), "duplicate display_order after {:?}", update);
        }
    }

    #[test]
    fn swap_never_collides() {
        let current = [("a", 0), ("b", 1), ("c", 2)];
        let plan = plan_reorder(&current, &["c", "b", "a"]);
        assert_eq!(plan.finalize.len(), 2);

        let mut state: HashMap<_, _> = current.iter().copied().collect();
        apply(&mut state, &plan.stage);
        apply(&mut state, &plan.finalize);
        assert_eq!(state["c"], 0);
        assert_eq!(state["b"], 1);
        assert_eq!(state["a"], 2);
    }

    #[test]
    fn unchanged_order_is_empty_plan() {
        let current = [("a", 0), ("b", 1)];
        assert!(plan_reorder(&current, &["a", "b"]).is_empty());
    }

    #[test]
    fn leftover_negative_values_are_avoided() {
        let current = [("a", -1), ("b", 0), ("c", 1)];
        let plan = plan_reorder(&current, &["b", "c", "a"]);
        assert!(plan.stage.iter().all(|u| u.display_order < -1));

        let mut state: HashMap<_, _> = current.iter().copied().collect();
        apply(&mut state, &plan.stage);
        apply(&mut state, &plan.finalize);
        assert_eq!(state["b"], 0);
        assert_eq!(state["c"], 1);
        assert_eq!(state["a"], 2);
    }

    #[test]
    fn unlisted_rows_keep_relative_order_at_the_end() {
        let current = [("a", 0), ("b", 1), ("c", 2), ("d", 3)];
        let plan = plan_reorder(&current, &["d", "x", "d"]);

        let mut state: HashMap<_, _> = current.iter().copied().collect();
        apply(&mut state, &plan.stage);
        apply(&mut state, &plan.finalize);
        assert_eq!(state["d"], 0);
        assert_eq!(state["a"], 1);
        assert_eq!(state["b"], 2);
        assert_eq!(state["c"], 3);
    }
}
