use std::path::Path;
use mct_rs::algorithms::heavy_edge_reducer::HeavyEdgeReducer;
use mct_rs::io::read_matrix_market_as_graph;
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let mut args = std::env::args().skip(1);
    let file_path = args.next().unwrap_or_else(|| "./testdata/example.mtx".to_string());
    let mincut: i64 = args.next().map(|m| m.parse()).transpose()?.unwrap_or(2);
    let mut graph = read_matrix_market_as_graph(Path::new(&file_path))?;
    let reducer = HeavyEdgeReducer::new(mincut);
    let pendants = reducer.remove_heavy_edges(&mut graph);
    let cycles = reducer.contract_cycle_edges(&mut graph);
    println!(
        "reduced to {} super-nodes, {} pendants and {} cycle vertices recorded",
        graph.n(),
        pendants.len(),
        cycles.len()
    );
    Ok(())
}
