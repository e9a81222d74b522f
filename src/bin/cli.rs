use clap::Parser;
use std::path::PathBuf;
use zonegen::pipeline::GeneratedMap;
use zonegen::zone::png::ZoneMap;
use zonegen::{MapConfig, RulesDb, generate_map};

/// Генератор зон и наград для стратегических карт
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML
    #[arg(short, long)]
    config: PathBuf,

    /// Путь для сохранения zones.png (по умолчанию: ./zones.png)
    #[arg(short, long, default_value = "zones.png")]
    output: PathBuf,

    /// Путь для JSON-отчёта о размещении (не задан — отчёт не пишется)
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Справочник правил в TOML (не задан — встроенный)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Переопределяет сид из конфигурации
    #[arg(short, long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    println!("🔍 Загрузка конфигурации...");
    let mut config = MapConfig::from_toml_file(cli.config.to_str().unwrap())?;
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    let rules = match &cli.rules {
        Some(path) => RulesDb::from_toml_file(path.to_str().unwrap())?,
        None => RulesDb::bundled(),
    };

    println!(
        "Генерация карты (размер: {}×{}, зон: {}, сид: {})...",
        config.width,
        config.height,
        config.zones.len(),
        config.seed
    );
    let map = generate_map(&config)?;

    println!(
        "Раскрой: {} зон, починка границ за {} проходов ({} тайлов переназначено)",
        map.zones.len(),
        map.repair.passes,
        map.repair.reassigned
    );
    println!(
        "Сегментов: {}, препятствий: {} тайлов, проходов: {}",
        map.segments.len(),
        map.obstacles.len(),
        map.gates.len()
    );
    println!(
        "Объектов размещено: {}, охранных отрядов: {}",
        map.distribution.placed_ids.len(),
        map.distribution.guards.len()
    );
    for failed in &map.distribution.failed_ids {
        eprintln!("  не поместился: {failed}");
    }

    println!("Сохранение в {:?}", cli.output);
    let zone_map = ZoneMap::new(&map.grid, 0);
    zone_map.save_as_png(cli.output.to_str().unwrap(), &map.grid, &map.zones)?;

    if let Some(report_path) = &cli.report {
        println!("Отчёт: {report_path:?}");
        let report = build_report(&map, &rules);
        std::fs::write(report_path, serde_json::to_string_pretty(&report)?)?;
    }

    println!("\nГотово! Карта зон сохранена.");
    Ok(())
}

/// Сводка размещения для инструментов поверх генератора
fn build_report(map: &GeneratedMap, rules: &RulesDb) -> serde_json::Value {
    let grid = &map.grid;

    let zones: Vec<serde_json::Value> = map
        .zones
        .iter()
        .map(|zone| {
            let seed = grid.pos(zone.seed);
            serde_json::json!({
                "id": zone.id,
                "area": zone.area.len(),
                "target_area": zone.absolute_area,
                "seed": [seed.x, seed.y],
            })
        })
        .collect();

    let objects: Vec<serde_json::Value> = map
        .distribution
        .objects
        .iter()
        .map(|placed| {
            let anchor = grid.pos(placed.plan.anchor);
            serde_json::json!({
                "id": placed.id,
                "anchor": [anchor.x, anchor.y],
                "heat": placed.plan.placed_heat,
                "segment": placed.plan.segment_index,
                "occupied": placed.plan.occupied.len(),
            })
        })
        .collect();

    let guards: Vec<serde_json::Value> = map
        .distribution
        .guards
        .iter()
        .map(|guard| {
            let pos = grid.pos(guard.pos);
            let stack = rules
                .suggest_guard(guard.value)
                .map(|s| format!("{} x{}", s.unit, s.count));
            serde_json::json!({
                "value": guard.value,
                "pos": [pos.x, pos.y],
                "stack": stack,
            })
        })
        .collect();

    let gates: Vec<serde_json::Value> = map
        .gates
        .iter()
        .map(|gate| {
            let pos = grid.pos(gate.gate);
            serde_json::json!({
                "from": gate.from,
                "to": gate.to,
                "pos": [pos.x, pos.y],
                "guard": gate.guard_value,
            })
        })
        .collect();

    serde_json::json!({
        "max_heat": map.distribution.max_heat,
        "zones": zones,
        "objects": objects,
        "guards": guards,
        "gates": gates,
        "failed": map.distribution.failed_ids,
    })
}
