use std::path::Path;
use sprs::io::{read_matrix_market, IoError};
use sprs::{CsMatI, TriMatI};
use crate::graph::MutableGraph;

/// Read a matrix market file and output a MutableGraph.
pub fn read_matrix_market_as_graph(file_path: &Path) -> Result<MutableGraph, IoError> {
    // read the matrix market file as a TriMat with edge weights.
    let trimatrix: TriMatI<f64, usize> = read_matrix_market(file_path)?;
    let csr_matrix: CsMatI<f64, usize> = trimatrix.to_csr();

    // Fold the matrix into undirected edges, each taken once: self loops are
    // dropped, the upper triangle wins when both directions are stored, and a
    // lone lower-triangle entry is still picked up. The graph starts out
    // already satisfying the contraction invariants.
    let mut graph = MutableGraph::start_construction(csr_matrix.rows());
    for (&weight, (vertex1, vertex2)) in csr_matrix.iter() {
        let weight = weight as i64;
        if vertex1 == vertex2 || weight == 0 {
            continue;
        }
        if vertex1 < vertex2 {
            graph.new_edge(vertex1, vertex2, weight);
        } else if csr_matrix.get(vertex2, vertex1).is_none() {
            graph.new_edge(vertex2, vertex1, weight);
        }
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write;
    use std::path::Path;
    use crate::io::read_matrix_market_as_graph;
    use tempfile::tempdir;

    fn create_mock_file(dir: &Path, filename: &str, content: &str) -> String {
        let file_path = dir.join(filename);
        let mut file = File::create(&file_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file_path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_read_matrix_market() -> Result<(), std::io::Error> {
        let temp_dir = tempdir()?;
        let content = "%%MatrixMarket matrix coordinate real symmetric\n%\n4 4 4\n2 1 3.0\n3 2 2.0\n4 3 5.0\n1 1 1.0\n";
        let matrix_file_path = create_mock_file(temp_dir.path(), "path_graph.mtx", content);

        let graph = read_matrix_market_as_graph(Path::new(&matrix_file_path)).unwrap();

        assert_eq!(graph.n(), 4);
        // the self loop on vertex 0 is dropped
        assert_eq!(graph.degree(0), 1);
        let e = graph.find_edge(0, 1).unwrap();
        assert_eq!(graph.edge_weight(0, e), 3);
        assert!(graph.find_edge(1, 2).is_some());
        assert!(graph.find_edge(2, 3).is_some());
        assert!(graph.find_edge(0, 3).is_none());

        Ok(())
    }
}
