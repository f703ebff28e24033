//! Static board data: categories, regions and rank names.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

/// Rank level 1, given to every account that has not been assigned one.
pub const DEFAULT_RANK: &str = "坚韧黑铁";

pub static RANK_NAMES: [&str; 10] = [
    DEFAULT_RANK,
    "英勇黄铜",
    "不屈白银",
    "荣耀黄金",
    "华贵铂金",
    "流光翡翠",
    "璀璨钻石",
    "超凡大师",
    "傲世宗师",
    "最强王者",
];

/// Name of a 1-based rank level.
pub fn rank_name(level: usize) -> Option<&'static str> {
    level.checked_sub(1).and_then(|i| RANK_NAMES.get(i).copied())
}

pub static REGIONS: [&str; 13] = [
    "以绪塔尔",
    "德玛西亚",
    "诺克萨斯",
    "艾欧尼亚",
    "皮尔特沃夫",
    "祖安",
    "弗雷尔卓德",
    "班德尔城",
    "暗影岛",
    "巨神峰",
    "恕瑞玛",
    "比尔吉沃特",
    "虚空",
];

#[derive(Debug, Serialize)]
pub struct Category {
    #[serde(skip)]
    pub key: &'static str,
    pub name: &'static str,
    pub desc: &'static str,
    pub icon: &'static str,
    pub parent: Option<&'static str>,
    #[serde(skip_serializing_if = "is_leaf")]
    pub subcategories: &'static [&'static str],
}

fn is_leaf(subs: &&'static [&'static str]) -> bool {
    subs.is_empty()
}

const fn parent(
    key: &'static str,
    name: &'static str,
    desc: &'static str,
    icon: &'static str,
    subcategories: &'static [&'static str],
) -> Category {
    Category { key, name, desc, icon, parent: None, subcategories }
}

const fn child(
    key: &'static str,
    name: &'static str,
    desc: &'static str,
    icon: &'static str,
    of: &'static str,
) -> Category {
    Category { key, name, desc, icon, parent: Some(of), subcategories: &[] }
}

/// Declaration order is display order.
static CATEGORIES: &[Category] = &[
    parent("plaza", "瓦罗兰广场", "聊天/灌水/日常讨论", "🏛️",
        &["plaza_chat_daily", "plaza_summoner_academic", "plaza_news", "plaza_activity"]),
    child("plaza_chat_daily", "聊天灌水", "日常聊天和讨论", "💧", "plaza"),
    child("plaza_summoner_academic", "学徒交流", "真正的大师，永远怀着一颗学徒的心～", "📚", "plaza"),
    child("plaza_news", "出大事了·公告板", "出大事了·公告板", "🪧", "plaza"),
    child("plaza_activity", "活动", "活动专区", "🎡", "plaza"),
    parent("gossip", "八卦娱乐", "娱乐八卦专区", "🔥",
        &["gossip_fan", "gossip_star", "gossip_chat", "gossip_bomb", "gossip_melon"]),
    child("gossip_fan", "约德尔大饭堂", "璐璐大王命令你立刻做饭！", "💊", "gossip"),
    child("gossip_star", "偶像明星", "大个子怪物们在这里", "🫧", "gossip"),
    child("gossip_bomb", "爆破雷区", "即使是死亡，也会因为点炮拉踩而颤抖不已！", "💣", "gossip"),
    child("gossip_melon", "吃瓜码头", "都是提莫打听来的", "🍉", "gossip"),
    child("gossip_chat", "818", "闲聊八卦", "🔍", "gossip"),
    parent("emotion", "情感专区", "情感交流", "🌙",
        &["emotion_tree", "emotion_love", "emotion_consult", "emotion_match"]),
    child("emotion_tree", "蘑菇树洞", "匿名倾诉", "🍄", "emotion"),
    child("emotion_love", "恋爱分享", "恋爱话题", "🐾", "emotion"),
    child("emotion_consult", "情感咨询", "情感建议", "🦄", "emotion"),
    child("emotion_match", "相亲角", "寻找缘分", "💞", "emotion"),
    parent("life", "生活市集", "功能性板块", "🗺️",
        &["life_trade", "life_team", "life_rental", "life_help"]),
    child("life_trade", "二手交易", "二手交易", "💸", "life"),
    child("life_team", "招募队友", "招募队友", "🍻", "life"),
    child("life_rental", "租赁", "租赁信息", "🏘️", "life"),
    child("life_help", "求助", "求助信息", "❓", "life"),
];

static BY_KEY: Lazy<HashMap<&'static str, &'static Category>> =
    Lazy::new(|| CATEGORIES.iter().map(|c| (c.key, c)).collect());

pub fn categories() -> &'static [Category] {
    CATEGORIES
}

pub fn category(key: &str) -> Option<&'static Category> {
    BY_KEY.get(key).copied()
}

/// Category keys a listing filtered by `key` should match: the key itself
/// plus its declared children. One level only.
pub fn category_filter(key: &str) -> Vec<&str> {
    let mut keys = vec![key];
    if let Some(cat) = category(key) {
        keys.extend(cat.subcategories.iter().copied());
    }
    keys
}

/// A subcategory as nested under its parent in the tree listing.
#[derive(Debug, Serialize)]
pub struct SubcategoryDescriptor {
    pub key: &'static str,
    #[serde(flatten)]
    pub category: &'static Category,
}

/// A top-level category with its children expanded.
#[derive(Debug, Serialize)]
pub struct CategoryNode {
    #[serde(skip)]
    pub key: &'static str,
    pub name: &'static str,
    pub desc: &'static str,
    pub icon: &'static str,
    pub parent: Option<&'static str>,
    pub subcategories: Vec<SubcategoryDescriptor>,
}

/// Top-level categories in declaration order, each with its children.
pub fn category_tree() -> Vec<CategoryNode> {
    CATEGORIES
        .iter()
        .filter(|c| c.parent.is_none())
        .map(|c| CategoryNode {
            key: c.key,
            name: c.name,
            desc: c.desc,
            icon: c.icon,
            parent: None,
            subcategories: c
                .subcategories
                .iter()
                .filter_map(|k| category(k))
                .map(|sub| SubcategoryDescriptor { key: sub.key, category: sub })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_declared_child_exists_and_points_back() {
        for cat in categories().iter().filter(|c| c.parent.is_none()) {
            for sub in cat.subcategories {
                let child = category(sub).expect("declared child missing");
                assert_eq!(child.parent, Some(cat.key));
            }
        }
    }

    #[test]
    fn filter_expands_one_level() {
        let keys = category_filter("gossip");
        assert!(keys.contains(&"gossip"));
        assert!(keys.contains(&"gossip_melon"));
        assert_eq!(keys.len(), 6);
        assert_eq!(category_filter("gossip_melon"), vec!["gossip_melon"]);
        assert_eq!(category_filter("nope"), vec!["nope"]);
    }

    #[test]
    fn tree_has_only_parents() {
        let tree = category_tree();
        let keys: Vec<_> = tree.iter().map(|n| n.key).collect();
        assert_eq!(keys, vec!["plaza", "gossip", "emotion", "life"]);
        assert_eq!(tree[0].subcategories.len(), 4);
    }

    #[test]
    fn rank_levels_are_one_based() {
        assert_eq!(rank_name(1), Some(DEFAULT_RANK));
        assert_eq!(rank_name(10), Some("最强王者"));
        assert_eq!(rank_name(0), None);
        assert_eq!(rank_name(11), None);
    }
}
