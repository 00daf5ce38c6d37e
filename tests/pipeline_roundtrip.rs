//! End-to-end round trips through parse → protect → translate (simulated)
//! → restore → reconstruct, without any live stores.

use gameloc::interpolation;
use gameloc::parsers::{IniParser, LuaParser, Parser, TxtParser};
use gameloc::textutil;
use gameloc::translation::split_batch_response;
use std::collections::HashMap;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(suffix).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn lua_extraction_protection_and_reconstruction() {
    let file = write_temp(".lua", "UI.ShowMessage(\"获得%d金币\")\n");
    let result = LuaParser.parse(file.path()).unwrap();

    assert_eq!(result.texts.len(), 1);
    let et = &result.texts[0];
    assert_eq!(et.text, "获得%d金币");
    assert_eq!(
        et.context.get("function").map(String::as_str),
        Some("UI.ShowMessage")
    );

    let (safe, mappings) = interpolation::protect(&et.text);
    assert_eq!(safe, "获得{{var_1}}金币");

    // The model translates the protected form; restore brings %d back.
    let translated = interpolation::restore("Nhận được {{var_1}} vàng", &mappings);
    assert_eq!(translated, "Nhận được %d vàng");

    let mut translations = HashMap::new();
    translations.insert(et.text.clone(), translated);
    let output = LuaParser.reconstruct(&result, &translations).unwrap();
    assert_eq!(
        String::from_utf8(output).unwrap(),
        "UI.ShowMessage(\"Nhận được %d vàng\")\n"
    );
}

#[test]
fn tsv_detection_and_selective_translation() {
    let file = write_temp(".txt", "1001\treward\t获得经验\n1002\treward_gold\t获得%d金币\n");
    let result = TxtParser.parse(file.path()).unwrap();

    assert_eq!(result.file_type, "tsv");
    let extracted: Vec<&str> = result.texts.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(extracted, vec!["获得经验", "获得%d金币"]);

    let mut translations = HashMap::new();
    translations.insert("获得经验".to_string(), "Nhận được Kinh nghiệm".to_string());
    translations.insert("获得%d金币".to_string(), "Nhận được %d vàng".to_string());

    let output = TxtParser.reconstruct(&result, &translations).unwrap();
    assert_eq!(
        String::from_utf8(output).unwrap(),
        "1001\treward\tNhận được Kinh nghiệm\n1002\treward_gold\tNhận được %d vàng\n"
    );
}

#[test]
fn ini_roundtrip_preserves_indentation() {
    let file = write_temp(".ini", "[ui]\ngreeting =   欢迎来到江湖\n");
    let result = IniParser.parse(file.path()).unwrap();

    let et = &result.texts[0];
    assert_eq!(et.text, "欢迎来到江湖");
    assert_eq!(et.context.get("section").map(String::as_str), Some("ui"));
    assert_eq!(et.context.get("key").map(String::as_str), Some("greeting"));

    let mut translations = HashMap::new();
    translations.insert(
        "欢迎来到江湖".to_string(),
        "Chào mừng đến Giang hồ".to_string(),
    );
    let output = IniParser.reconstruct(&result, &translations).unwrap();
    assert_eq!(
        String::from_utf8(output).unwrap(),
        "[ui]\ngreeting =   Chào mừng đến Giang hồ\n"
    );
}

#[test]
fn batch_response_populates_cache_entries() {
    let batch = vec!["技能升级".to_string(), "装备强化".to_string()];
    let response = "Kỹ năng nâng cấp ||| Trang bị cường hóa";

    let slots = split_batch_response(response, batch.len());
    let mut cache: HashMap<String, String> = HashMap::new();
    for (text, slot) in batch.iter().zip(&slots) {
        if let Some(translated) = slot {
            cache.insert(textutil::hash(text), translated.clone());
        }
    }

    assert_eq!(
        cache.get(&textutil::hash("技能升级")).map(String::as_str),
        Some("Kỹ năng nâng cấp")
    );
    assert_eq!(
        cache.get(&textutil::hash("装备强化")).map(String::as_str),
        Some("Trang bị cường hóa")
    );
}

#[test]
fn untranslated_strings_survive_reconstruction_unchanged() {
    // A batch failure leaves the cache without these strings; the file
    // comes back with the source text intact.
    let content = "[npc]\nname = 掌门\ntitle = 武当掌门\n";
    let file = write_temp(".ini", content);
    let result = IniParser.parse(file.path()).unwrap();

    let mut translations = HashMap::new();
    translations.insert("掌门".to_string(), "Chưởng môn".to_string());

    let output = IniParser.reconstruct(&result, &translations).unwrap();
    assert_eq!(
        String::from_utf8(output).unwrap(),
        "[npc]\nname = Chưởng môn\ntitle = 武当掌门\n"
    );
}
