use crate::physics::{delta_phi, transverse_mass, Met, MetAugmentable, MetVariables};

/// MET-relative variables of one object
pub fn met_variables<C: MetAugmentable>(object: &C, met: &Met) -> MetVariables {
    let dphi = delta_phi(object.phi(), met.phi);
    MetVariables {
        d_phi_met: dphi,
        mt_met: transverse_mass(object.pt(), met.pt, dphi),
    }
}

/// Attach MET-relative variables to every object in place
pub fn add_met_variables<C: MetAugmentable>(objects: &mut [C], met: &Met) {
    for object in objects.iter_mut() {
        let vars = met_variables(object, met);
        object.set_met_vars(vars);
    }
}
