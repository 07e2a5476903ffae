use crate::{RateCommand, StampCommand};
use owo_colors::OwoColorize;
use stamps::config::{self, StampsConfig};
use stamps::currency::format_euro_cents;
use stamps::output::{emit_success, OutputMode};
use stamps::storage::StampStore;
use stamps::ui::{self, Icons};
use stamps::NewStamp;
use std::path::Path;

pub fn run_show(store: &StampStore, output_mode: OutputMode) -> anyhow::Result<()> {
    let stamps = store.list_stamps()?;
    let rates = store.list_rates()?;

    if !output_mode.is_human() {
        let data = serde_json::json!({
            "database": store.path().display().to_string(),
            "stamps": stamps,
            "postage_rates": rates,
        });
        return emit_success(output_mode, "show", data);
    }

    ui::info("Database", &store.path().display().to_string());

    ui::section("Stamp Collection");
    if stamps.is_empty() {
        println!("  {} {}", Icons::EMPTY, ui::dim("No stamps in collection yet."));
    } else {
        println!("{}", ui::stamps_table(&stamps));
    }

    ui::section("Postage Rates");
    if rates.is_empty() {
        println!("  {} {}", Icons::EMPTY, ui::dim("No postage rates defined."));
    } else {
        println!("{}", ui::rates_table(&rates));
    }
    Ok(())
}

pub fn run_stamp(store: &StampStore, command: StampCommand, output_mode: OutputMode) -> anyhow::Result<()> {
    match command {
        StampCommand::Add { name, value, currency, quantity, rate_id } => {
            let mut stamp = NewStamp::from_code(name, value, &currency)?.with_quantity(quantity);
            if let Some(rate_id) = rate_id {
                stamp = stamp.with_postage_rate(rate_id);
            }
            let id = store.add_stamp(&stamp)?;

            if output_mode.is_human() {
                ui::success(&format!(
                    "Added {} (id {}, {} x {})",
                    stamp.name.bold(),
                    id,
                    stamp.quantity,
                    format_euro_cents(stamp.euro_cents())
                ));
            } else {
                let data = serde_json::json!({ "id": id, "euro_cents": stamp.euro_cents() });
                emit_success(output_mode, "stamp.add", data)?;
            }
        }

        StampCommand::List => {
            let stamps = store.list_stamps()?;
            if output_mode.is_human() {
                if stamps.is_empty() {
                    println!("{} {}", Icons::EMPTY, ui::dim("No stamps in collection yet."));
                } else {
                    println!("{}", ui::stamps_table(&stamps));
                }
            } else {
                emit_success(output_mode, "stamp.list", stamps)?;
            }
        }

        StampCommand::Get { id } => {
            let Some(stamp) = store.get_stamp(id)? else {
                anyhow::bail!("stamp {} not found", id);
            };
            if output_mode.is_human() {
                println!("{}", ui::stamps_table(std::slice::from_ref(&stamp)));
            } else {
                emit_success(output_mode, "stamp.get", stamp)?;
            }
        }

        StampCommand::SetQuantity { id, quantity } => {
            if !store.update_stamp_quantity(id, quantity)? {
                anyhow::bail!("stamp {} not found", id);
            }
            if output_mode.is_human() {
                ui::success(&format!("Stamp {} now has {} copies", id, quantity));
            } else {
                emit_success(output_mode, "stamp.set-quantity", serde_json::json!({ "id": id, "quantity": quantity }))?;
            }
        }

        StampCommand::Delete { id } => {
            if !store.delete_stamp(id)? {
                anyhow::bail!("stamp {} not found", id);
            }
            if output_mode.is_human() {
                println!("{} Deleted stamp {}", Icons::DEL, id);
            } else {
                emit_success(output_mode, "stamp.delete", serde_json::json!({ "id": id }))?;
            }
        }

        StampCommand::Clear => {
            let removed = store.clear_stamps()?;
            if output_mode.is_human() {
                println!("{} Removed {} stamps", Icons::DEL, removed);
            } else {
                emit_success(output_mode, "stamp.clear", serde_json::json!({ "removed": removed }))?;
            }
        }
    }
    Ok(())
}

pub fn run_rate(store: &StampStore, command: RateCommand, output_mode: OutputMode) -> anyhow::Result<()> {
    match command {
        RateCommand::Add { name, value, max_weight } => {
            let id = store.add_or_replace_rate(&name, value, max_weight)?;
            if output_mode.is_human() {
                ui::success(&format!("Stored rate {} (id {})", name.bold(), id));
            } else {
                emit_success(output_mode, "rate.add", serde_json::json!({ "id": id, "name": name }))?;
            }
        }

        RateCommand::List { weight } => {
            let mut rates = store.list_rates()?;
            if let Some(grams) = weight {
                rates.retain(|rate| rate.covers(grams));
            }
            if output_mode.is_human() {
                if rates.is_empty() {
                    println!("{} {}", Icons::EMPTY, ui::dim("No postage rates defined."));
                } else {
                    println!("{}", ui::rates_table(&rates));
                }
            } else {
                emit_success(output_mode, "rate.list", rates)?;
            }
        }

        RateCommand::Get { name } => {
            let Some(rate) = store.get_rate_by_name(&name)? else {
                anyhow::bail!("postage rate '{}' not found", name);
            };
            if output_mode.is_human() {
                println!("{}", ui::rates_table(std::slice::from_ref(&rate)));
            } else {
                emit_success(output_mode, "rate.get", rate)?;
            }
        }

        RateCommand::Update { name, value, max_weight } => {
            if !store.update_rate(&name, value, max_weight)? {
                anyhow::bail!("postage rate '{}' not found", name);
            }
            if output_mode.is_human() {
                ui::success(&format!(
                    "Updated {}: {} up to {} g",
                    name,
                    format_euro_cents((value * 100.0).round() as i64),
                    max_weight
                ));
            } else {
                emit_success(output_mode, "rate.update", serde_json::json!({ "name": name }))?;
            }
        }

        RateCommand::Delete { name } => {
            if !store.delete_rate(&name)? {
                anyhow::bail!("postage rate '{}' not found", name);
            }
            if output_mode.is_human() {
                println!("{} Deleted rate {}", Icons::DEL, name);
            } else {
                emit_success(output_mode, "rate.delete", serde_json::json!({ "name": name }))?;
            }
        }
    }
    Ok(())
}

pub fn run_sample(store: &StampStore, output_mode: OutputMode) -> anyhow::Result<()> {
    store.load_sample_data()?;
    let count = store.count_stamps()?;
    if output_mode.is_human() {
        println!("{} Sample data loaded ({} stamps in collection)", Icons::NEW, count);
    } else {
        emit_success(output_mode, "sample", serde_json::json!({ "stamps": count }))?;
    }
    Ok(())
}

pub fn run_stats(store: &StampStore, output_mode: OutputMode) -> anyhow::Result<()> {
    let stats = store.stats()?;
    if output_mode.is_human() {
        ui::header("Collection Statistics");
        println!("{}", ui::stats_table(&stats));
        ui::summary_row(&format!("{} Total value", Icons::EURO), stats.total_euro_cents);
    } else {
        emit_success(output_mode, "stats", stats)?;
    }
    Ok(())
}

pub fn run_init(config_path: &Path, database: &Path, force: bool, output_mode: OutputMode) -> anyhow::Result<()> {
    let config = StampsConfig {
        database: Some(database.display().to_string()),
    };
    config::write_config(config_path, &config, force)?;

    if output_mode.is_human() {
        ui::banner(
            "Config written",
            &format!("{} -> {}", config_path.display(), database.display()),
        );
    } else {
        emit_success(output_mode, "init", config)?;
    }
    Ok(())
}
