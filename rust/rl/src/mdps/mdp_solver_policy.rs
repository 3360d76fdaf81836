use super::mdp_solver::*;
use gridworld::*;
use std::rc::Rc;

/// Acts greedily with respect to whatever a solver has computed so far.
pub struct MdpSolverPolicy<'a> {
    pub mdp_solver: Rc<dyn MdpSolver + 'a>,
}

impl Policy for MdpSolverPolicy<'_> {
    fn policy(&self, s: &State) -> Option<Action> {
        self.mdp_solver.pi_star(*s)
    }
}
