mod instance_tests;
