mod helpers;

mod reference_orbit;
