//! Environment bindings for Python.

use std::path::PathBuf;

use numpy::{PyArray1, PyArrayMethods};
use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::core::Observation;
use crate::env::{EnvConfig, Environment, OpponentEnv, StepResult, TicTacToeEnv};
use crate::error::{ConfigError, EnvError};
use crate::nn::Mlp;
use crate::policy::{MinimaxPolicy, Policy, QNetworkPolicy, RandomPolicy};
use crate::render::{RenderMode, RenderOutput};

use super::py_nn::PyQNetwork;

fn env_err(e: EnvError) -> PyErr {
    match e {
        EnvError::Model(m) => PyIOError::new_err(m.to_string()),
        other => PyValueError::new_err(other.to_string()),
    }
}

fn config_err(e: ConfigError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn obs_array<'py>(py: Python<'py>, obs: &Observation) -> Bound<'py, PyArray1<u8>> {
    PyArray1::from_slice_bound(py, obs)
}

fn step_tuple(py: Python<'_>, result: StepResult) -> PyResult<PyObject> {
    let info = PyDict::new_bound(py);
    info.set_item("winner", result.info.winner().map(|p| p.index()))?;
    info.set_item("rejected", result.info.rejected)?;
    info.set_item("opponent_action", result.info.opponent_action)?;
    info.set_item("steps_beyond_done", result.info.steps_beyond_done)?;
    let obs = obs_array(py, &result.observation);
    Ok((obs, result.reward, result.done, info).into_py(py))
}

fn render_value(py: Python<'_>, output: Option<RenderOutput>) -> PyResult<PyObject> {
    match output {
        None => Ok(py.None()),
        Some(RenderOutput::Text(s)) => Ok(s.into_py(py)),
        Some(RenderOutput::Frame(f)) => {
            let [h, w, c] = f.shape();
            let array = PyArray1::from_vec_bound(py, f.pixels).reshape([h, w, c])?;
            Ok(array.into_py(py))
        }
    }
}

fn parse_mode(mode: &str) -> PyResult<RenderMode> {
    mode.parse().map_err(PyValueError::new_err)
}

fn config(id: usize, seed: Option<u64>) -> EnvConfig {
    let config = EnvConfig::default().with_player_id(id);
    match seed {
        Some(s) => config.with_seed(s),
        None => config,
    }
}

/// Two-player tic-tac-toe; successive `step` calls alternate sides.
#[pyclass(name = "TicTacToeEnv", unsendable)]
pub struct PyTicTacToeEnv {
    env: TicTacToeEnv,
}

#[pymethods]
impl PyTicTacToeEnv {
    #[new]
    #[pyo3(signature = (id = 0, seed = None))]
    fn new(id: usize, seed: Option<u64>) -> PyResult<Self> {
        let env = TicTacToeEnv::from_config(config(id, seed)).map_err(config_err)?;
        Ok(Self { env })
    }

    fn reset<'py>(&mut self, py: Python<'py>) -> Bound<'py, PyArray1<u8>> {
        obs_array(py, &self.env.reset())
    }

    /// Returns `(observation, reward, done, info)`.
    fn step(&mut self, py: Python<'_>, action: usize) -> PyResult<PyObject> {
        let result = self.env.step(action).map_err(env_err)?;
        step_tuple(py, result)
    }

    #[pyo3(signature = (mode = "human"))]
    fn render(&mut self, py: Python<'_>, mode: &str) -> PyResult<PyObject> {
        let mode = parse_mode(mode)?;
        render_value(py, self.env.render(mode))
    }

    fn close(&mut self) {
        self.env.close();
    }

    #[pyo3(signature = (seed = None))]
    fn seed(&mut self, seed: Option<u64>) -> Vec<u64> {
        self.env.seed(seed)
    }

    fn __repr__(&self) -> String {
        format!("TicTacToeEnv(id={})", self.env.player().index())
    }
}

/// Tic-tac-toe against an opponent policy.
///
/// `opponent` is one of `"model"`, `"random"` or `"minimax"`. The model
/// opponent uses `network` if given (any callable, e.g. a Keras model's
/// `predict`), otherwise loads `dqn_ttt{id}` weights from `model_dir`.
#[pyclass(name = "OpponentEnv", unsendable)]
pub struct PyOpponentEnv {
    env: OpponentEnv<Box<dyn Policy>>,
}

#[pymethods]
impl PyOpponentEnv {
    #[new]
    #[pyo3(signature = (id = 0, opponent = "model", model_dir = None, network = None, seed = None))]
    fn new(
        id: usize,
        opponent: &str,
        model_dir: Option<PathBuf>,
        network: Option<PyQNetwork>,
        seed: Option<u64>,
    ) -> PyResult<Self> {
        let policy: Box<dyn Policy> = match (opponent, network) {
            ("model", Some(net)) => Box::new(QNetworkPolicy::new(net)),
            ("model", None) => {
                let dir = model_dir.unwrap_or_else(|| PathBuf::from("."));
                let mlp = Mlp::load_for_player(dir, id)
                    .map_err(|e| PyIOError::new_err(e.to_string()))?;
                Box::new(QNetworkPolicy::new(mlp))
            }
            ("random", _) => Box::new(RandomPolicy),
            ("minimax", _) => Box::new(MinimaxPolicy::new()),
            (other, _) => {
                return Err(PyValueError::new_err(format!("unknown opponent '{}'", other)))
            }
        };
        let env = OpponentEnv::from_config(config(id, seed), policy).map_err(env_err)?;
        Ok(Self { env })
    }

    fn reset<'py>(&mut self, py: Python<'py>) -> Bound<'py, PyArray1<u8>> {
        obs_array(py, &self.env.reset())
    }

    /// Returns `(observation, reward, done, info)`.
    fn step(&mut self, py: Python<'_>, action: usize) -> PyResult<PyObject> {
        let result = self.env.step(action).map_err(env_err)?;
        step_tuple(py, result)
    }

    #[pyo3(signature = (mode = "human"))]
    fn render(&mut self, py: Python<'_>, mode: &str) -> PyResult<PyObject> {
        let mode = parse_mode(mode)?;
        render_value(py, self.env.render(mode))
    }

    fn close(&mut self) {
        self.env.close();
    }

    #[pyo3(signature = (seed = None))]
    fn seed(&mut self, seed: Option<u64>) -> Vec<u64> {
        self.env.seed(seed)
    }

    /// The side the opponent plays (0 or 1).
    #[getter]
    fn opponent_id(&self) -> usize {
        self.env.opponent_player().index()
    }

    fn __repr__(&self) -> String {
        format!(
            "OpponentEnv(id={}, opponent={})",
            self.env.opponent_player().index(),
            self.env.opponent().name()
        )
    }
}
