//! Built-in density table
//!
//! U.S. Standard Atmosphere 1976 mass densities, 0-500 km in 10 km steps.

/// Sample altitudes (km)
pub const STANDARD_ALTITUDES_KM: [f64; 51] = [
    0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, //
    100.0, 110.0, 120.0, 130.0, 140.0, 150.0, 160.0, 170.0, 180.0, 190.0, //
    200.0, 210.0, 220.0, 230.0, 240.0, 250.0, 260.0, 270.0, 280.0, 290.0, //
    300.0, 310.0, 320.0, 330.0, 340.0, 350.0, 360.0, 370.0, 380.0, 390.0, //
    400.0, 410.0, 420.0, 430.0, 440.0, 450.0, 460.0, 470.0, 480.0, 490.0, //
    500.0,
];

/// Mass density at each sample altitude (kg/m³)
pub const STANDARD_DENSITIES_KG_M3: [f64; 51] = [
    1.225e0, 4.1351e-1, 8.8910e-2, 1.8410e-2, 3.9957e-3, //
    1.0269e-3, 3.0968e-4, 8.2829e-5, 1.8458e-5, 3.4160e-6, //
    5.6040e-7, 9.7080e-8, 2.2220e-8, 8.1520e-9, 3.8310e-9, //
    2.0760e-9, 1.2330e-9, 7.8150e-10, 5.1940e-10, 3.5810e-10, //
    2.5410e-10, 1.8460e-10, 1.3670e-10, 1.0290e-10, 7.8580e-11, //
    6.0730e-11, 4.7420e-11, 3.7380e-11, 2.9710e-11, 2.3780e-11, //
    1.9160e-11, 1.5520e-11, 1.2640e-11, 1.0350e-11, 8.5030e-12, //
    7.0140e-12, 5.8050e-12, 4.8200e-12, 4.0130e-12, 3.3500e-12, //
    2.8030e-12, 2.3500e-12, 1.9750e-12, 1.6620e-12, 1.4020e-12, //
    1.1840e-12, 1.0020e-12, 8.4920e-13, 7.2080e-13, 6.1270e-13, //
    5.2150e-13,
];
