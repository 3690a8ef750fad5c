pub mod heavy_edge_reducer;
pub mod max_flow_min_cut;
pub mod multicut_local_search;
