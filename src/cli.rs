use crate::app::engine::CallGraphEngine;
use anyhow::Result;

/// Print the text dump of every unit.
pub fn display_dump(engine: &CallGraphEngine) -> Result<()> {
    print!("{}", engine.dump());
    Ok(())
}

pub fn display_dot(engine: &CallGraphEngine) -> Result<()> {
    print!("{}", engine.dot());
    Ok(())
}

/// Print every graph (nodes in reverse postorder) as JSON.
pub fn display_graph_json(engine: &CallGraphEngine) -> Result<()> {
    let output = serde_json::json!({
        "units": engine.graph_dumps(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn display_stats(engine: &CallGraphEngine) -> Result<()> {
    for summary in engine.summaries() {
        println!("Unit: {}", summary.unit);
        println!("{}", "=".repeat(60));
        println!("  Nodes:                  {:>8}", summary.node_count);
        println!("  Call edges:             {:>8}", summary.call_edge_count);
        println!("  Override pairs:         {:>8}", summary.override_pairs);
        println!("  Bodies walked:          {:>8}", summary.stats.bodies_walked);
        println!("  Call sites:             {:>8}", summary.stats.call_sites);
        println!("  Block call edges:       {:>8}", summary.stats.block_call_edges);
        println!("  Message call edges:     {:>8}", summary.stats.message_call_edges);
        println!(
            "  Function pointer edges: {:>8}",
            summary.stats.function_pointer_edges
        );
        println!();
    }
    Ok(())
}

pub fn display_callees(engine: &CallGraphEngine, qualified_name: &str) -> Result<()> {
    for result in engine.callees(qualified_name)? {
        println!("[{}] {}", result.unit, result.function);
        print_list("calls", &result.callees);
        print_list("called by", &result.callers);
        print_list("overrides", &result.overrides);
        print_list("overridden by", &result.overridden_by);
        println!();
    }
    Ok(())
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("  {}:", title);
    for item in items {
        println!("    {}", item);
    }
}

pub fn display_keys(engine: &CallGraphEngine) -> Result<()> {
    for entry in engine.keys() {
        println!("{}\t{}\t{}", entry.unit, entry.key, entry.label);
    }
    Ok(())
}
