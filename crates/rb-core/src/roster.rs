//! The built-in hero roster.
//!
//! Heroes double as seed identities (logging in as one materializes a stored
//! account) and as reserved names nobody may register or rename to.

use crate::ids::EntityId;
use crate::models::{User, UserProfile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hero {
    pub id: &'static str,
    pub username: &'static str,
    pub avatar: &'static str,
    pub rank: &'static str,
    pub title: &'static str,
    pub identity: &'static str,
}

impl Hero {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: EntityId::from(self.id),
            username: self.username.to_string(),
            avatar: Some(self.avatar.to_string()),
            rank: self.rank.to_string(),
            title: self.title.to_string(),
            identity: self.identity.to_string(),
        }
    }

    /// A stored account seeded from this hero.
    pub fn to_user(&self, password: &str) -> User {
        User {
            id: EntityId::from(self.id),
            username: self.username.to_string(),
            password: password.to_string(),
            avatar: Some(self.avatar.to_string()),
            rank: self.rank.to_string(),
            title: self.title.to_string(),
            identity: self.identity.to_string(),
        }
    }
}

macro_rules! hero {
    ($id:literal, $name:literal, $rank:literal, $title:literal, $identity:literal) => {
        Hero {
            id: $id,
            username: $name,
            avatar: concat!("avatar/", $name, ".png"),
            rank: $rank,
            title: $title,
            identity: $identity,
        }
    };
}

static HEROES: &[Hero] = &[
    hero!("阿狸", "Ahri", "璀璨钻石", "九尾妖狐", "艾欧尼亚"),
    hero!("盖伦", "Garen", "荣耀黄金", "德玛西亚之力", "德玛西亚"),
    hero!("拉克丝", "Lux", "华贵铂金", "光辉女郎", "德玛西亚"),
    hero!("德莱厄斯", "Darius", "超凡大师", "诺克萨斯之手", "诺克萨斯"),
    hero!("卡特琳娜", "Katarina", "璀璨钻石", "不祥之刃", "诺克萨斯"),
    hero!("亚索", "Yasuo", "傲世宗师", "疾风剑豪", "艾欧尼亚"),
    hero!("金克丝", "Jinx", "流光翡翠", "暴走萝莉", "祖安"),
    hero!("蔚", "Vi", "荣耀黄金", "皮城执法官", "皮尔特沃夫"),
    hero!("凯特琳", "Caitlyn", "华贵铂金", "皮城女警", "皮尔特沃夫"),
    hero!("艾希", "Ashe", "璀璨钻石", "寒冰射手", "弗雷尔卓德"),
    hero!("提莫", "Teemo", "英勇黄铜", "迅捷斥候", "班德尔城"),
    hero!("璐璐", "Lulu", "不屈白银", "仙灵女巫", "班德尔城"),
    hero!("锤石", "Thresh", "超凡大师", "魂锁典狱长", "暗影岛"),
    hero!("阿兹尔", "Azir", "最强王者", "沙漠皇帝", "恕瑞玛"),
    hero!("普朗克", "Gangplank", "流光翡翠", "海洋之灾", "比尔吉沃特"),
    hero!("卡莎", "Kaisa", "傲世宗师", "虚空之女", "虚空"),
    hero!("潘森", "Pantheon", "超凡大师", "不屈之枪", "巨神峰"),
    hero!("辛德拉", "Syndra", "璀璨钻石", "暗黑元首", "以绪塔尔"),
];

/// Read-only view over the hero list.
#[derive(Debug, Clone, Copy)]
pub struct HeroRoster {
    heroes: &'static [Hero],
}

static ROSTER: HeroRoster = HeroRoster { heroes: HEROES };

impl HeroRoster {
    pub fn builtin() -> &'static HeroRoster {
        &ROSTER
    }

    pub fn heroes(&self) -> &'static [Hero] {
        self.heroes
    }

    /// Exact, case-sensitive name match.
    pub fn by_username(&self, username: &str) -> Option<&'static Hero> {
        self.heroes.iter().find(|h| h.username == username)
    }

    pub fn by_id(&self, id: &EntityId) -> Option<&'static Hero> {
        self.heroes.iter().find(|h| *id == h.id)
    }

    pub fn is_reserved(&self, username: &str) -> bool {
        self.by_username(username).is_some()
    }

    pub fn profiles(&self) -> Vec<UserProfile> {
        self.heroes.iter().map(Hero::profile).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_and_ids_are_unique() {
        let roster = HeroRoster::builtin();
        let names: HashSet<_> = roster.heroes().iter().map(|h| h.username).collect();
        let ids: HashSet<_> = roster.heroes().iter().map(|h| h.id).collect();
        assert_eq!(names.len(), roster.heroes().len());
        assert_eq!(ids.len(), roster.heroes().len());
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let roster = HeroRoster::builtin();
        assert!(roster.is_reserved("Ahri"));
        assert!(!roster.is_reserved("ahri"));
        assert_eq!(roster.by_id(&EntityId::from("阿狸")).map(|h| h.username), Some("Ahri"));
    }

    #[test]
    fn seeded_user_takes_given_password() {
        let user = HeroRoster::builtin().by_username("Lux").unwrap().to_user("letmein");
        assert_eq!(user.password, "letmein");
        assert_eq!(user.avatar.as_deref(), Some("avatar/Lux.png"));
    }
}
