use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::{ConnectionInput, FlameTracer, GraphInput, HyperRouter, Variant};

fn to_value_error(err: impl std::fmt::Display) -> PyErr {
    PyErr::new::<PyValueError, _>(err.to_string())
}

/// Python driver surface over the hypergraph router. Inputs arrive in the
/// serialized ID-form as JSON strings.
#[pyclass]
pub struct Router {
    inner: HyperRouter,
}

#[pymethods]
impl Router {
    #[new]
    #[pyo3(signature = (graph_json, connections_json, variant = "jumper"))]
    fn new(graph_json: &str, connections_json: &str, variant: &str) -> PyResult<Self> {
        let graph: GraphInput = serde_json::from_str(graph_json).map_err(to_value_error)?;
        let connections: Vec<ConnectionInput> =
            serde_json::from_str(connections_json).map_err(to_value_error)?;
        let variant = match variant {
            "jumper" => Variant::jumper(),
            "via" => Variant::via(),
            other => {
                return Err(PyErr::new::<PyValueError, _>(format!(
                    "unknown variant {other}"
                )))
            }
        };
        let inner = HyperRouter::from_inputs(&graph, &connections, variant).map_err(to_value_error)?;
        Ok(Router { inner })
    }

    fn step(&mut self) -> PyResult<()> {
        self.inner.step().map_err(to_value_error)
    }

    fn solve(&mut self) -> PyResult<()> {
        self.inner.solve().map_err(to_value_error)
    }

    #[getter]
    fn solved(&self) -> bool {
        self.inner.solved()
    }

    #[getter]
    fn failed(&self) -> bool {
        self.inner.failed()
    }

    #[getter]
    fn iterations(&self) -> u64 {
        self.inner.iterations()
    }

    fn routes_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.inner.routes_snapshot()).map_err(to_value_error)
    }

    fn snapshot_json(&self, top_k: usize) -> PyResult<String> {
        serde_json::to_string(&self.inner.snapshot(top_k)).map_err(to_value_error)
    }
}

#[pyclass]
pub struct Tracer {
    _inner: FlameTracer,
}

#[pymethods]
impl Tracer {
    #[new]
    fn new() -> Self {
        Tracer {
            _inner: FlameTracer::install(),
        }
    }
}

// A module to wrap the Python functions and structs
#[pymodule]
fn _core(_py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Router>()?;
    m.add_class::<Tracer>()?;
    Ok(())
}
