//! Python bindings for the tic-tac-toe environments.
//!
//! # Quick Start
//!
//! ```python
//! import tictactoe_gym as ttt
//!
//! env = ttt.OpponentEnv(id=1, opponent="minimax", seed=0)
//! obs = env.reset()
//! obs, reward, done, info = env.step(4)
//! frame = env.render("rgb_array")   # numpy array (400, 600, 3)
//! env.close()
//!
//! # Use a Keras model as the opponent
//! net = ttt.QNetwork(model.predict)
//! env = ttt.OpponentEnv(id=0, network=net)
//! ```

use pyo3::prelude::*;

mod py_env;
mod py_nn;

pub use py_env::*;
pub use py_nn::*;

/// tictactoe_gym: tic-tac-toe RL environments.
#[pymodule]
fn tictactoe_gym(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyTicTacToeEnv>()?;
    m.add_class::<PyOpponentEnv>()?;
    m.add_class::<PyQNetwork>()?;
    Ok(())
}
