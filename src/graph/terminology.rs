//! Bundled bilingual terminology for 剑侠世界2
//!
//! Domain data, not user input: the Chinese→Vietnamese term list and the
//! directed relationships between terms that seed the knowledge graph.
//! Extending the game vocabulary means editing these tables; no schema
//! change is involved.

/// (chinese, vietnamese, category)
pub const TERMS: &[(&str, &str, &str)] = &[
    // Core combat / cultivation
    ("真气", "Chân khí", "cultivation"),
    ("内功", "Nội công", "cultivation"),
    ("外功", "Ngoại công", "cultivation"),
    ("轻功", "Khinh công", "cultivation"),
    ("心法", "Tâm pháp", "cultivation"),
    ("心法等级", "Cấp tâm pháp", "cultivation"),
    // Organization / social
    ("门派", "Môn phái", "faction"),
    ("掌门", "Chưởng môn", "character"),
    ("弟子", "Đệ tử", "character"),
    ("帮派", "Bang phái", "faction"),
    // Game mechanics
    ("副本", "Phó bản", "gameplay"),
    ("经验", "Kinh nghiệm", "gameplay"),
    ("装备", "Trang bị", "item"),
    ("强化", "Cường hóa", "gameplay"),
    ("等级", "Cấp", "gameplay"),
    ("技能", "Kỹ năng", "skill"),
    ("坐骑", "Ngựa cưỡi", "item"),
    // Exploration
    ("藏宝图", "Bản đồ kho báu", "item"),
    ("江湖", "Giang hồ", "location"),
    ("门派任务", "Nhiệm vụ môn phái", "gameplay"),
    // Additional common terms
    ("侠客", "Hiệp khách", "character"),
    ("武功", "Võ công", "combat"),
    ("秘籍", "Bí kíp", "item"),
    ("丹药", "Đan dược", "item"),
    ("暗器", "Ám khí", "item"),
    ("阵法", "Trận pháp", "skill"),
    ("气血", "Khí huyết", "cultivation"),
    ("穴位", "Huyệt vị", "cultivation"),
    ("经脉", "Kinh mạch", "cultivation"),
    ("境界", "Cảnh giới", "cultivation"),
    ("修炼", "Tu luyện", "cultivation"),
    ("突破", "Đột phá", "cultivation"),
    ("宝石", "Bảo thạch", "item"),
    ("锻造", "Đúc rèn", "gameplay"),
    ("任务", "Nhiệm vụ", "gameplay"),
    ("背包", "Ba lô", "gameplay"),
    ("商城", "Thương thành", "gameplay"),
    ("金币", "Vàng", "currency"),
    ("元宝", "Nguyên bảo", "currency"),
    ("银两", "Bạc", "currency"),
    ("攻击", "Tấn công", "combat"),
    ("防御", "Phòng ngự", "combat"),
    ("暴击", "Bạo kích", "combat"),
    ("闪避", "Né tránh", "combat"),
    ("命中", "Mệnh trúng", "combat"),
    ("生命", "Sinh mệnh", "combat"),
    ("法力", "Pháp lực", "combat"),
];

/// (from_chinese, relationship_type, to_chinese) — direction carries meaning.
pub const RELATIONSHIPS: &[(&str, &str, &str)] = &[
    ("真气", "USED_IN", "技能"),
    ("技能", "BELONGS_TO", "门派"),
    ("装备", "REQUIRES", "等级"),
    ("心法", "IMPROVES", "技能"),
    ("内功", "TYPE_OF", "武功"),
    ("外功", "TYPE_OF", "武功"),
    ("轻功", "TYPE_OF", "武功"),
    ("掌门", "LEADS", "门派"),
    ("弟子", "MEMBER_OF", "门派"),
    ("门派任务", "ASSIGNED_BY", "门派"),
    ("强化", "APPLIED_TO", "装备"),
    ("宝石", "ENHANCES", "装备"),
    ("经脉", "CHANNELS", "真气"),
    ("修炼", "INCREASES", "境界"),
    ("突破", "ADVANCES", "境界"),
    ("丹药", "RESTORES", "气血"),
    ("秘籍", "TEACHES", "技能"),
    ("暗器", "TYPE_OF", "装备"),
    ("阵法", "TYPE_OF", "技能"),
    ("锻造", "CREATES", "装备"),
    ("副本", "REWARDS", "经验"),
    ("副本", "DROPS", "装备"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terms_are_unique_by_chinese() {
        let mut seen = std::collections::HashSet::new();
        for (chinese, _, _) in TERMS {
            assert!(seen.insert(chinese), "duplicate term {}", chinese);
        }
    }

    #[test]
    fn test_relationship_endpoints_are_known_terms() {
        let known: std::collections::HashSet<&str> =
            TERMS.iter().map(|(c, _, _)| *c).collect();
        for (from, rel, to) in RELATIONSHIPS {
            assert!(known.contains(from), "{} missing for {}", from, rel);
            assert!(known.contains(to), "{} missing for {}", to, rel);
        }
    }
}
